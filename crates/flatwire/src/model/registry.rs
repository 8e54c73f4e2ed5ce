// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Concurrent registry of type models.
//!
//! Each Rust type is modelled at most once per registry; later lookups return
//! the same `Arc<TypeModel>`. Models are built outside any map lock, so two
//! threads racing on a cold type may both build one, and the first to insert
//! wins. Both callers observe the winner.
//!
//! Tables may refer to themselves through `Option`, `Box`, `Rc` or `Arc`.
//! Fixed structs may not, since they would have no finite size.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::sync::Arc;
use std::time::Instant;

use super::error::ModelError;
use super::type_model::{ForwardTarget, TypeModel};
use super::Flat;

/// Registry hit/miss statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
    pub last_hit_ns: u64,
    pub last_miss_ns: u64,
}

/// Maps Rust types to their published type models.
pub struct TypeModelRegistry {
    models: DashMap<TypeId, Arc<TypeModel>>,
    stats: RwLock<LookupStats>,
}

impl Default for TypeModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            models: DashMap::new(),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    /// Model of `T`, building and publishing it (and every type it reaches)
    /// on first request.
    pub fn get_type_model<T: Flat>(&self) -> Result<Arc<TypeModel>, ModelError> {
        ModelContext::new(self).resolve::<T>()
    }

    /// Published model of `T`, without building.
    pub fn lookup<T: Flat>(&self) -> Option<Arc<TypeModel>> {
        self.models
            .get(&TypeId::of::<T>())
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains<T: Flat>(&self) -> bool {
        self.models.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    /// Drop every published model. Outstanding `Arc`s stay valid.
    pub fn clear(&self) {
        self.models.clear();
        *self.stats.write() = LookupStats::default();
    }

    fn cached(&self, id: TypeId, started: Instant) -> Option<Arc<TypeModel>> {
        let hit = self.models.get(&id).map(|entry| Arc::clone(entry.value()));
        if hit.is_some() {
            let mut stats = self.stats.write();
            stats.hits += 1;
            stats.last_hit_ns = elapsed_ns(started);
        }
        hit
    }

    fn publish(&self, id: TypeId, model: Arc<TypeModel>, started: Instant) -> Arc<TypeModel> {
        let published = Arc::clone(self.models.entry(id).or_insert(model).value());
        let mut stats = self.stats.write();
        stats.misses += 1;
        stats.last_miss_ns = elapsed_ns(started);
        published
    }
}

fn elapsed_ns(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// Model-building session.
///
/// Tracks the types currently under construction. A table that reaches
/// itself, as in `next: Option<Box<Node>>`, gets a forward reference that is
/// bound once its own model is finished. Models built while such a cycle is
/// still open depend on the unfinished table and are returned to their
/// caller without being published.
pub struct ModelContext<'r> {
    registry: &'r TypeModelRegistry,
    in_progress: Vec<Pending>,
}

struct Pending {
    id: TypeId,
    /// Created on the first self reference.
    forward: Option<ForwardTarget>,
    /// Reached an unfinished type further down the stack.
    depends_on_open: bool,
}

impl<'r> ModelContext<'r> {
    pub fn new(registry: &'r TypeModelRegistry) -> Self {
        Self {
            registry,
            in_progress: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'r TypeModelRegistry {
        self.registry
    }

    /// Model of `T`: the published one if any, otherwise built through
    /// `T::type_model` and published.
    pub fn resolve<T: Flat>(&mut self) -> Result<Arc<TypeModel>, ModelError> {
        let id = TypeId::of::<T>();
        let started = Instant::now();
        if let Some(model) = self.registry.cached(id, started) {
            return Ok(model);
        }
        if let Some(pos) = self.in_progress.iter().position(|p| p.id == id) {
            return Ok(self.forward_reference(pos, type_name::<T>()));
        }

        self.in_progress.push(Pending {
            id,
            forward: None,
            depends_on_open: false,
        });
        let built = T::type_model(self);
        let Some(pending) = self.in_progress.pop() else {
            return built;
        };

        let model = match built {
            Ok(model) => model,
            // a struct field pointing back at an unfinished struct
            Err(ModelError::ReferenceInStruct { .. }) if pending.forward.is_some() => {
                return Err(ModelError::RecursiveType {
                    type_name: type_name::<T>(),
                })
            }
            Err(e) => return Err(e),
        };
        if let Some(forward) = &pending.forward {
            if !model.is_table() {
                return Err(ModelError::RecursiveType {
                    type_name: type_name::<T>(),
                });
            }
            // targets are bound only here, so the set cannot fail
            let _ = forward.set(Arc::downgrade(&model));
        }
        if pending.depends_on_open {
            log::trace!(
                "[registry] built '{}' inside an open cycle, not published",
                model.name()
            );
            return Ok(model);
        }

        let model = self.registry.publish(id, model, started);
        log::debug!(
            "[registry] published model '{}' for {}",
            model.name(),
            type_name::<T>()
        );
        Ok(model)
    }

    fn forward_reference(&mut self, pos: usize, name: &str) -> Arc<TypeModel> {
        for later in &mut self.in_progress[pos + 1..] {
            later.depends_on_open = true;
        }
        let target = Arc::clone(
            self.in_progress[pos]
                .forward
                .get_or_insert_with(ForwardTarget::default),
        );
        log::trace!("[registry] forward reference to '{}'", name);
        Arc::new(TypeModel::forward(name, target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BaseType;
    use crate::Flat;

    #[derive(Debug, Default, Flat)]
    struct Node {
        value: i32,
        next: Option<Box<Node>>,
    }

    #[derive(Debug, Default, Flat)]
    struct Parent {
        child: Option<Box<Child>>,
    }

    #[derive(Debug, Default, Flat)]
    struct Child {
        parent: Option<std::rc::Rc<Parent>>,
        label: String,
    }

    #[derive(Debug, Default, Flat)]
    #[flat(fixed)]
    struct Endless {
        inner: Box<Endless>,
    }

    #[test]
    fn same_type_yields_same_model() {
        let registry = TypeModelRegistry::new();
        let a = registry.get_type_model::<i32>().unwrap();
        let b = registry.get_type_model::<i32>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.base_type(), BaseType::Int);

        let stats = registry.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn wrappers_resolve_element_types() {
        let registry = TypeModelRegistry::new();
        let v = registry.get_type_model::<Vec<u16>>().unwrap();
        assert_eq!(v.base_type(), BaseType::Vector);
        assert!(registry.contains::<u16>());
        assert!(registry.contains::<Vec<u16>>());

        let opt = registry.get_type_model::<Option<Vec<u16>>>().unwrap();
        assert!(Arc::ptr_eq(&v, &opt));
    }

    #[test]
    fn clear_forgets_models() {
        let registry = TypeModelRegistry::new();
        registry.get_type_model::<String>().unwrap();
        assert!(!registry.is_empty());
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.lookup::<String>().is_none());
    }

    #[test]
    fn concurrent_first_requests_agree() {
        let registry = Arc::new(TypeModelRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.get_type_model::<Vec<f64>>().unwrap())
            })
            .collect();
        let models: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for model in &models[1..] {
            assert!(Arc::ptr_eq(&models[0], model));
        }
    }

    #[test]
    fn self_referential_table_points_at_itself() {
        let registry = TypeModelRegistry::new();
        let node = registry.get_type_model::<Node>().unwrap();
        assert!(node.is_table());

        let next = node.struct_def().unwrap().field("next").unwrap();
        assert!(next.is_nullable());
        assert!(Arc::ptr_eq(&next.type_model(), &node));
        assert!(Arc::ptr_eq(&registry.lookup::<Node>().unwrap(), &node));
        // the wrapper types were built around the unfinished table
        assert!(!registry.contains::<Option<Box<Node>>>());
    }

    #[test]
    fn mutually_recursive_tables_resolve() {
        let registry = TypeModelRegistry::new();
        let parent = registry.get_type_model::<Parent>().unwrap();
        let child = parent.struct_def().unwrap().field("child").unwrap().type_model();
        assert_eq!(child.name(), "Child");

        let back = child.struct_def().unwrap().field("parent").unwrap().type_model();
        assert!(Arc::ptr_eq(&back, &parent));

        // requested on its own, Child is built and published normally
        let published = registry.get_type_model::<Child>().unwrap();
        assert!(registry.contains::<Child>());
        let back = published.struct_def().unwrap().field("parent").unwrap().type_model();
        assert!(Arc::ptr_eq(&back, &parent));
    }

    #[test]
    fn self_containing_struct_is_rejected() {
        let registry = TypeModelRegistry::new();
        assert!(matches!(
            registry.get_type_model::<Endless>(),
            Err(ModelError::RecursiveType { .. })
        ));
        assert!(!registry.contains::<Endless>());
    }
}
