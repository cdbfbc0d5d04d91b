//! Binder context: element type, range-variable scopes and the re-entrant
//! filter binder handle.

use std::ops::{Deref, DerefMut};

use crate::catalog::SchemaCatalog;
use crate::config::BinderConfig;
use crate::error::{BindError, Result};
use crate::types::{DataType, TypeRef};

use super::filter::NestedFilterBinder;

/// A range variable declared by a clause or lambda.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFrame {
    /// Range variable name.
    pub name: String,
    /// Declared type of the variable.
    pub data_type: TypeRef,
}

/// State threaded through every node binder for one top-level bind call.
///
/// A context must not be shared across concurrent bind calls; the `&mut`
/// borrow taken by each binder enforces that.
pub struct BinderContext<'a> {
    element_type: DataType,
    catalog: &'a dyn SchemaCatalog,
    config: BinderConfig,
    /// Innermost frame last.
    scopes: Vec<ScopeFrame>,
    depth: usize,
    filter_binder: Option<&'a dyn NestedFilterBinder>,
}

impl<'a> BinderContext<'a> {
    /// Creates a context for binding clauses over `element_type`.
    #[must_use]
    pub fn new(catalog: &'a dyn SchemaCatalog, element_type: DataType) -> Self {
        BinderContext {
            element_type,
            catalog,
            config: BinderConfig::default(),
            scopes: Vec::new(),
            depth: 0,
            filter_binder: None,
        }
    }

    /// Sets the binder configuration.
    #[must_use]
    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the element type clauses are bound against.
    #[must_use]
    pub fn element_type(&self) -> &DataType {
        &self.element_type
    }

    /// Returns the schema catalog.
    #[must_use]
    pub fn catalog(&self) -> &'a dyn SchemaCatalog {
        self.catalog
    }

    /// Returns the binder configuration.
    #[must_use]
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Returns the number of range variables currently in scope.
    #[must_use]
    pub fn scope_len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns the current binding depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Looks up a range variable, innermost scope first.
    ///
    /// # Errors
    ///
    /// Returns `UnboundVariable` if no enclosing scope declares `name`.
    pub fn resolve_range_variable(&self, name: &str) -> Result<&TypeRef> {
        self.scopes
            .iter()
            .rev()
            .find(|frame| frame.name == name)
            .map(|frame| &frame.data_type)
            .ok_or_else(|| BindError::UnboundVariable(name.to_string()))
    }

    /// Returns the filter binder recorded by the running filter bind, if any.
    #[must_use]
    pub fn active_filter_binder(&self) -> Option<&'a dyn NestedFilterBinder> {
        self.filter_binder
    }

    /// Records the filter binder used for nested sub-filters.
    pub fn set_filter_binder(&mut self, binder: &'a dyn NestedFilterBinder) {
        self.filter_binder = Some(binder);
    }

    /// Declares a range variable until the returned guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns `RecursionLimitExceeded` if the depth bound is reached.
    pub fn push_scope(&mut self, name: &str, data_type: TypeRef) -> Result<ScopeGuard<'_, 'a>> {
        self.enter()?;
        self.scopes.push(ScopeFrame {
            name: name.to_string(),
            data_type,
        });
        Ok(ScopeGuard {
            context: self,
            restore: Restore::Pop,
        })
    }

    /// Swaps in an empty scope stack until the returned guard is dropped, so a
    /// nested clause sees none of the caller's range variables.
    ///
    /// # Errors
    ///
    /// Returns `RecursionLimitExceeded` if the depth bound is reached.
    pub fn push_isolated(&mut self) -> Result<ScopeGuard<'_, 'a>> {
        self.enter()?;
        let saved = std::mem::take(&mut self.scopes);
        Ok(ScopeGuard {
            context: self,
            restore: Restore::Stack(saved),
        })
    }

    /// Counts one level of node nesting until the returned guard is dropped.
    pub(crate) fn descend(&mut self) -> Result<ScopeGuard<'_, 'a>> {
        self.enter()?;
        Ok(ScopeGuard {
            context: self,
            restore: Restore::Depth,
        })
    }

    fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(BindError::RecursionLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }
}

enum Restore {
    Depth,
    Pop,
    /// Holds the caller's stack while an isolated one is active.
    Stack(Vec<ScopeFrame>),
}

/// Releases what [`BinderContext`] acquired when dropped, on success, error
/// or unwind alike.
pub struct ScopeGuard<'c, 'a> {
    context: &'c mut BinderContext<'a>,
    restore: Restore,
}

impl<'a> Deref for ScopeGuard<'_, 'a> {
    type Target = BinderContext<'a>;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl DerefMut for ScopeGuard<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl Drop for ScopeGuard<'_, '_> {
    fn drop(&mut self) {
        match std::mem::replace(&mut self.restore, Restore::Depth) {
            Restore::Depth => {}
            Restore::Pop => {
                self.context.scopes.pop();
            }
            Restore::Stack(saved) => self.context.scopes = saved,
        }
        self.context.depth -= 1;
    }
}
