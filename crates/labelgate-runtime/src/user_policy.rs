//! Per-principal policy façade.
//!
//! A [`UserPolicy`] answers every "may this principal do X" question for
//! one principal. It combines the principal's [`LabelStatements`] with
//! global [`PolicyBitmask`] capabilities, the schema's labelling
//! configuration and an injected override gate.
//!
//! # Decision Flow
//!
//! ```text
//! has_permission(op, object)
//!        │
//!        ▼
//! statements.allow(op, labels) ──yes──► allowed
//!        │ no
//!        ▼
//! op empty? ──yes──► denied
//!        │ no
//!        ▼
//! gate.allow_on_object(request) ──allow──► allowed (info log)
//!        │ no change / error
//!        ▼
//! denied (warn log) / Err(HookError)
//! ```
//!
//! The gate can only turn a denial into an allow, never the reverse.
//!
//! # Lifetime
//!
//! Build one `UserPolicy` per request. The top-level add UI answer is
//! memoized on the instance, so a long-lived instance will not notice
//! schema changes.

use crate::config::PolicyConfig;
use crate::{LabellingPolicy, ObjectStore, PolicyError, Schema};
use labelgate_auth::{
    AccessDenied, LabelFilter, LabelStatements, Permission, PolicyBitmask, PolicyKind, RuleList,
};
use labelgate_hook::{HookError, HookRegistry, NoOverride, OverrideGate, OverrideRequest};
use labelgate_types::{
    LabelChangeSet, LabelSet, ObjectRef, Principal, SearchSubset, StoreOperation, StoredObject,
};
use std::sync::{Arc, OnceLock};

/// Everything a policy needs besides the principal's own rules.
///
/// Shared between the policies built for concurrent requests.
#[derive(Clone)]
pub struct PolicyContext {
    schema: Arc<dyn Schema>,
    store: Arc<dyn ObjectStore>,
    gate: Arc<dyn OverrideGate>,
    config: PolicyConfig,
}

impl std::fmt::Debug for PolicyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PolicyContext {
    /// Creates a context with no override gate.
    #[must_use]
    pub fn new(schema: Arc<dyn Schema>, store: Arc<dyn ObjectStore>, config: PolicyConfig) -> Self {
        Self {
            schema,
            store,
            gate: Arc::new(NoOverride),
            config,
        }
    }

    /// Replaces the override gate.
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<dyn OverrideGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Uses the registry's enabled override hooks as the gate.
    ///
    /// The hooks are resolved now. Later registry changes need a new
    /// context.
    #[must_use]
    pub fn with_hooks(self, hooks: &HookRegistry) -> Self {
        let chain = hooks.resolve_gate();
        tracing::debug!(hooks = ?chain.hook_ids(), "resolved override gate");
        if chain.is_empty() {
            return self;
        }
        self.with_gate(Arc::new(chain))
    }

    /// Returns the schema.
    #[must_use]
    pub fn schema(&self) -> &dyn Schema {
        self.schema.as_ref()
    }

    /// Returns the object store.
    #[must_use]
    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Returns the override gate.
    #[must_use]
    pub fn gate(&self) -> &dyn OverrideGate {
        self.gate.as_ref()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Labelling policy over this context's schema and store.
    #[must_use]
    pub fn labelling_policy(&self) -> LabellingPolicy {
        LabellingPolicy::new(
            Arc::clone(&self.schema),
            Arc::clone(&self.store),
            self.config.max_type_depth,
        )
    }
}

/// Permission and capability checks for one principal.
///
/// # Example
///
/// ```
/// use labelgate_auth::{Permission, PermissionRule, PolicyBitmask, RuleList};
/// use labelgate_runtime::config::PolicyConfig;
/// use labelgate_runtime::{InMemoryHierarchy, InMemorySchema, PolicyContext, UserPolicy};
/// use labelgate_types::{Label, LabelSet, Principal, PrincipalId, StoredObject};
/// use std::sync::Arc;
///
/// let context = Arc::new(PolicyContext::new(
///     Arc::new(InMemorySchema::new()),
///     Arc::new(InMemoryHierarchy::new()),
///     PolicyConfig::default(),
/// ));
///
/// let mut rules = RuleList::new();
/// rules.push(
///     RuleList::DISTANCE_USER,
///     PermissionRule::allow(Label::new(7), Permission::READ).expect("valid rule"),
/// );
/// let policy = UserPolicy::from_rules(
///     Principal::User(PrincipalId::new(1)),
///     rules,
///     PolicyBitmask::NONE,
///     context,
/// );
///
/// let doc = StoredObject::new().with_labels(LabelSet::from_iter([Label::new(7)]));
/// assert!(policy.has_permission(Permission::READ, &doc)?);
/// assert!(!policy.has_permission(Permission::UPDATE, &doc)?);
/// # Ok::<(), labelgate_hook::HookError>(())
/// ```
#[derive(Debug)]
pub struct UserPolicy {
    principal: Principal,
    statements: LabelStatements,
    policy: PolicyBitmask,
    context: Arc<PolicyContext>,
    top_level_add_ui: OnceLock<bool>,
}

impl UserPolicy {
    /// Creates a policy from evaluated statements.
    #[must_use]
    pub fn new(
        principal: Principal,
        statements: LabelStatements,
        policy: PolicyBitmask,
        context: Arc<PolicyContext>,
    ) -> Self {
        Self {
            principal,
            statements,
            policy,
            context,
            top_level_add_ui: OnceLock::new(),
        }
    }

    /// Creates the system policy, which may do anything.
    #[must_use]
    pub fn super_user(context: Arc<PolicyContext>) -> Self {
        Self::new(
            Principal::System,
            LabelStatements::SuperUser,
            PolicyBitmask::SUPER_USER,
            context,
        )
    }

    /// Creates a policy from a principal's rules, using the context's
    /// untracked label mode.
    #[must_use]
    pub fn from_rules(
        principal: Principal,
        rules: RuleList,
        policy: PolicyBitmask,
        context: Arc<PolicyContext>,
    ) -> Self {
        let statements = rules
            .into_rule_set()
            .to_statements(context.config().untracked_label);
        Self::new(principal, statements, policy, context)
    }

    /// Returns the principal.
    #[must_use]
    pub fn principal(&self) -> Principal {
        self.principal
    }

    /// Returns the label statements.
    #[must_use]
    pub fn statements(&self) -> &LabelStatements {
        &self.statements
    }

    /// Returns the global capability bitmask.
    #[must_use]
    pub fn policy(&self) -> PolicyBitmask {
        self.policy
    }

    /// Returns the shared context.
    #[must_use]
    pub fn context(&self) -> &PolicyContext {
        &self.context
    }

    /// Is the principal allowed `operation` on `object`?
    ///
    /// Label rules decide first. A denial is offered to the override
    /// gate, which may allow it.
    ///
    /// # Errors
    ///
    /// Returns the gate's error if an override hook fails.
    pub fn has_permission(&self, operation: Permission, object: &StoredObject) -> Result<bool, HookError> {
        if self.statements.allow(operation, &object.labels) {
            tracing::debug!(
                principal = %self.principal,
                operation = %operation,
                labels = %object.labels,
                "permission granted"
            );
            return Ok(true);
        }

        if operation.is_empty() {
            return Ok(false);
        }

        let request = OverrideRequest {
            principal: self.principal,
            object,
            operation,
        };
        if self.context.gate().allow_on_object(&request)?.allow {
            tracing::info!(
                principal = %self.principal,
                operation = %operation,
                object = ?object.reference,
                labels = %object.labels,
                "permission denial overridden by hook"
            );
            return Ok(true);
        }

        tracing::warn!(
            principal = %self.principal,
            operation = %operation,
            object = ?object.reference,
            labels = %object.labels,
            "permission denied"
        );
        Ok(false)
    }

    /// Like [`UserPolicy::has_permission`], but a denial is an error.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Denied`] when not allowed, or
    /// [`PolicyError::Hook`] when an override hook fails.
    pub fn check_permission(&self, operation: Permission, object: &StoredObject) -> Result<(), PolicyError> {
        if self.has_permission(operation, object)? {
            return Ok(());
        }
        Err(AccessDenied::PermissionDenied {
            principal: self.principal,
            operation,
            labels: object.labels.clone(),
        }
        .into())
    }

    /// May the principal see the object's version history?
    ///
    /// History reveals past edits, so it follows update permission.
    ///
    /// # Errors
    ///
    /// Same as [`UserPolicy::has_permission`].
    pub fn can_view_history_of(&self, object: &StoredObject) -> Result<bool, HookError> {
        self.has_permission(Permission::UPDATE, object)
    }

    /// Could the principal create an object of `type_ref` with the
    /// labels the labelling policy would give it?
    ///
    /// Override hooks are not consulted. Returns `false` for types with
    /// no descriptor.
    #[must_use]
    pub fn can_create_object_of_type(&self, type_ref: ObjectRef) -> bool {
        let labelling = self.context.labelling_policy();
        let template = StoredObject::of_type(type_ref);
        if labelling.root_descriptor_for(&template).is_none() {
            return false;
        }
        let changes = labelling.modify_changes_to_apply_labelling_policy(
            LabelChangeSet::new(),
            StoreOperation::Create,
            &template,
            None,
        );
        self.statements
            .allow(Permission::CREATE, &changes.change(&template.labels))
    }

    /// Applicable labels of `type_ref` the principal may create against.
    ///
    /// Returns `None` for types with no descriptor.
    #[must_use]
    pub fn allowed_applicable_labels_for_type(&self, type_ref: ObjectRef) -> Option<LabelSet> {
        let descriptor = self
            .context
            .schema()
            .root_type_descriptor(type_ref, self.context.config().max_type_depth)?;
        Some(
            descriptor
                .applicable_labels()
                .iter()
                .filter(|label| self.statements.label_is_allowed(Permission::CREATE, *label))
                .collect(),
        )
    }

    /// Should the top-level "add" UI be shown at all?
    ///
    /// True when some root type is offered for creation and the
    /// principal may create it. Computed once per instance.
    #[must_use]
    pub fn should_show_top_level_add_ui(&self) -> bool {
        *self.top_level_add_ui.get_or_init(|| {
            let schema = self.context.schema();
            let config = self.context.config();
            let found = schema.root_types().into_iter().find(|type_ref| {
                schema.type_descriptor(*type_ref).is_some_and(|descriptor| {
                    config.is_offered_for_creation(descriptor.creation_ui_position())
                }) && self.can_create_object_of_type(*type_ref)
            });
            tracing::debug!(
                principal = %self.principal,
                type_ref = ?found,
                "resolved top-level add UI"
            );
            found.is_some()
        })
    }

    /// May the principal use a saved search subset?
    ///
    /// Every label the subset includes must be readable.
    #[must_use]
    pub fn can_search_subset_be_used(&self, subset: &SearchSubset) -> bool {
        subset
            .include_labels
            .iter()
            .all(|label| self.statements.label_is_allowed(Permission::READ, label))
    }

    /// Are all capabilities in `required` granted?
    #[must_use]
    pub fn check_policy_bitmask(&self, required: PolicyBitmask) -> bool {
        self.policy.check(required)
    }

    /// Is the capability granted?
    #[must_use]
    pub fn can(&self, kind: PolicyKind) -> bool {
        self.policy.can(kind)
    }

    /// Like [`UserPolicy::can`], but a missing capability is an error.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied::PolicyDenied`] naming the capability.
    pub fn check_policy(&self, kind: PolicyKind) -> Result<(), AccessDenied> {
        if self.can(kind) {
            return Ok(());
        }
        tracing::warn!(principal = %self.principal, policy = kind.as_str(), "policy denied");
        Err(AccessDenied::PolicyDenied {
            principal: self.principal,
            policy: kind.as_str(),
        })
    }

    /// Label filter restricting bulk queries to permitted objects.
    #[must_use]
    pub fn query_filter(&self, operation: Permission) -> LabelFilter {
        self.statements.query_filter(operation, &LabelSet::new())
    }

    /// Like [`UserPolicy::query_filter`], also excluding `excludes`.
    #[must_use]
    pub fn query_filter_excluding(&self, operation: Permission, excludes: &LabelSet) -> LabelFilter {
        self.statements.query_filter(operation, excludes)
    }
}
