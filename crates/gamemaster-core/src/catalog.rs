//! The cascade coordinator: keeps the entity mirror consistent with the
//! backing store across every create, update, and delete.
//!
//! Every mutation follows the same protocol:
//!
//! 1. Validate against the mirror. Failures return before the gateway is
//!    touched.
//! 2. Issue the statement(s). A failure stops the sequence and propagates.
//! 3. Put or remove the primary entity in the mirror.
//! 4. Reload dependent collections in [`cascade::reloads`] order. A failed
//!    reload marks that kind and every kind after it stale, then
//!    propagates.
//! 5. Record one audit entry. Audit failures are logged and swallowed.

use std::collections::BTreeSet;

use gamemaster_types::{Admin, Client, EntityKind, Provider, UserId, Verb};

use crate::audit::AuditSink;
use crate::cascade::{self, Statement};
use crate::error::{CatalogError, Operation, WrongKind};
use crate::gateway::Gateway;
use crate::rules::Validate;
use crate::store::{EntityStore, Stored, StoreSummary};

/// In-memory mirror of the catalog bound to a gateway and an audit sink.
///
/// Mutations take `&mut self`, so one catalog has exactly one writer and
/// statements within an operation are awaited strictly in sequence.
#[derive(Debug)]
pub struct Catalog<G, A> {
    gateway: G,
    audit: A,
    store: EntityStore,
    stale: BTreeSet<EntityKind>,
}

impl<G: Gateway, A: AuditSink> Catalog<G, A> {
    /// Create a catalog with an empty mirror.
    ///
    /// Call [`load_all`](Self::load_all) to populate it.
    pub const fn new(gateway: G, audit: A) -> Self {
        Self {
            gateway,
            audit,
            store: EntityStore::new(),
            stale: BTreeSet::new(),
        }
    }

    /// The mirror.
    pub const fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Kinds whose last reload failed and that may lag the backing store.
    pub const fn stale_kinds(&self) -> &BTreeSet<EntityKind> {
        &self.stale
    }

    /// Whether `kind` may lag the backing store.
    pub fn is_stale(&self, kind: EntityKind) -> bool {
        self.stale.contains(&kind)
    }

    /// The gateway.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Mutable access to the gateway.
    pub const fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// The audit sink.
    pub const fn audit(&self) -> &A {
        &self.audit
    }

    /// Mutable access to the audit sink.
    pub const fn audit_mut(&mut self) -> &mut A {
        &mut self.audit
    }

    /// Reload all eight collections in load order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] on the first failed load. That
    /// kind and every kind after it are left stale.
    pub async fn load_all(&mut self) -> Result<StoreSummary, CatalogError> {
        self.reload_in_order(&EntityKind::ALL).await?;
        let summary = self.store.summary();
        tracing::info!(%summary, "Catalog mirror loaded");
        Ok(summary)
    }

    /// Replace one collection with a fresh gateway scan.
    ///
    /// On failure the old collection is kept and `kind` is marked stale.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if the scan fails or returns a
    /// row of another kind.
    pub async fn reload(&mut self, kind: EntityKind) -> Result<usize, CatalogError> {
        let result = match self.gateway.load_all(kind).await {
            Ok(rows) => self
                .store
                .replace_records(kind, rows)
                .map_err(|err| CatalogError::persistence(kind, Operation::Load, err)),
            Err(err) => Err(CatalogError::persistence(kind, Operation::Load, err)),
        };

        match result {
            Ok(count) => {
                self.stale.remove(&kind);
                tracing::debug!(kind = kind.as_str(), count, "Reloaded collection");
                Ok(count)
            }
            Err(err) => {
                self.stale.insert(kind);
                Err(err)
            }
        }
    }

    async fn reload_in_order(&mut self, kinds: &[EntityKind]) -> Result<(), CatalogError> {
        for (position, kind) in kinds.iter().enumerate() {
            if let Err(err) = self.reload(*kind).await {
                let pending = kinds.get(position..).unwrap_or_default();
                self.stale.extend(pending.iter().copied());
                tracing::warn!(
                    kind = kind.as_str(),
                    stale = ?self.stale,
                    error = %err,
                    "Reload failed, mirror left stale"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Refresh one entity from the gateway.
    ///
    /// A row found replaces the mirrored value; an absent row is removed
    /// from the mirror and reported as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if the lookup fails.
    pub async fn read<E: Stored>(&mut self, key: E::Key) -> Result<Option<E>, CatalogError> {
        let row = self
            .gateway
            .select(E::record_key(key))
            .await
            .map_err(|err| CatalogError::persistence(E::KIND, Operation::Select, err))?;

        let Some(row) = row else {
            self.store.remove::<E>(key);
            return Ok(None);
        };

        let value = E::from_record(row).map_err(|other| {
            CatalogError::persistence(
                E::KIND,
                Operation::Select,
                WrongKind {
                    expected: E::KIND,
                    found: other.kind(),
                },
            )
        })?;
        self.store.put(value.clone());
        Ok(Some(value))
    }

    /// Insert a new entity.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UniqueConstraintViolation`] if the key is
    /// taken, [`CatalogError::InvalidInput`] if a domain rule fails, or
    /// [`CatalogError::Persistence`] if the insert fails.
    pub async fn create<E: Validate>(&mut self, value: E) -> Result<(), CatalogError> {
        let key = value.key();
        if self.store.contains::<E>(key) {
            return Err(CatalogError::duplicate(E::KIND, format!("key {key}")));
        }
        value.validate(&self.store, Verb::Create)?;

        self.gateway
            .insert(&value.clone().into_record())
            .await
            .map_err(|err| CatalogError::persistence(E::KIND, Operation::Insert, err))?;
        tracing::debug!(kind = E::KIND.as_str(), %key, "Inserted");

        self.store.put(value);
        self.finish(E::KIND, Verb::Create).await
    }

    /// Rewrite an existing entity.
    ///
    /// Returns `Ok(false)` when the backing store holds no row with this
    /// key; the mirror then drops it too.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] or
    /// [`CatalogError::UniqueConstraintViolation`] if a domain rule fails,
    /// or [`CatalogError::Persistence`] if the update fails.
    pub async fn update<E: Validate>(&mut self, value: E) -> Result<bool, CatalogError> {
        value.validate(&self.store, Verb::Update)?;

        let key = value.key();
        let affected = self
            .gateway
            .update(&value.clone().into_record())
            .await
            .map_err(|err| CatalogError::persistence(E::KIND, Operation::Update, err))?;

        if affected == 0 {
            tracing::debug!(kind = E::KIND.as_str(), %key, "Update found no row");
            self.store.remove::<E>(key);
            return Ok(false);
        }
        tracing::debug!(kind = E::KIND.as_str(), %key, "Updated");

        self.store.put(value);
        self.finish(E::KIND, Verb::Update).await?;
        Ok(true)
    }

    /// Delete an entity and everything that depends on it.
    ///
    /// Returns `Ok(false)` when the backing store held no row with this
    /// key. Dependent collections are reloaded either way.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Persistence`] if a cascade statement or a
    /// dependent reload fails. If some statements already succeeded, the
    /// collections this delete reloads are marked stale.
    pub async fn delete<E: Stored>(&mut self, key: E::Key) -> Result<bool, CatalogError> {
        let plan = cascade::delete_plan(&self.store, E::record_key(key));
        let reloads = cascade::reloads(E::KIND, Verb::Delete);

        let mut primary_affected = 0;
        for (issued, statement) in plan.statements().enumerate() {
            match self.execute(statement).await {
                Ok(affected) => {
                    if statement == Statement::Delete(plan.primary) {
                        primary_affected = affected;
                    }
                }
                Err(err) => {
                    if issued > 0 {
                        self.stale.extend(reloads.iter().copied());
                        tracing::warn!(
                            kind = E::KIND.as_str(),
                            %key,
                            statement = %statement,
                            stale = ?self.stale,
                            "Cascade interrupted"
                        );
                    }
                    return Err(err);
                }
            }
        }

        self.store.remove::<E>(key);
        self.reload_in_order(reloads).await?;

        if primary_affected == 0 {
            tracing::debug!(kind = E::KIND.as_str(), %key, "Delete found no row");
            return Ok(false);
        }
        self.emit(E::KIND, Verb::Delete);
        Ok(true)
    }

    /// Delete an account of whichever kind holds `id` in the mirror.
    ///
    /// Returns `Ok(false)` when no mirrored account has this ID.
    ///
    /// # Errors
    ///
    /// Same as [`delete`](Self::delete).
    pub async fn delete_user(&mut self, id: UserId) -> Result<bool, CatalogError> {
        if self.store.contains::<Admin>(id) {
            self.delete::<Admin>(id).await
        } else if self.store.contains::<Client>(id) {
            self.delete::<Client>(id).await
        } else if self.store.contains::<Provider>(id) {
            self.delete::<Provider>(id).await
        } else {
            Ok(false)
        }
    }

    async fn execute(&mut self, statement: Statement) -> Result<u64, CatalogError> {
        let result = match statement {
            Statement::DeleteRelated(relation) => self.gateway.delete_related(relation).await,
            Statement::Reassign { game, publisher } => {
                self.gateway.reassign_publisher(game, publisher).await
            }
            Statement::Delete(key) => self.gateway.delete(key).await,
        };
        let affected = result.map_err(|err| {
            CatalogError::persistence(statement.kind(), statement.operation(), err)
        })?;
        tracing::debug!(%statement, affected, "Statement executed");
        Ok(affected)
    }

    async fn finish(&mut self, kind: EntityKind, verb: Verb) -> Result<(), CatalogError> {
        self.reload_in_order(cascade::reloads(kind, verb)).await?;
        self.emit(kind, verb);
        Ok(())
    }

    fn emit(&mut self, kind: EntityKind, verb: Verb) {
        if let Err(err) = self.audit.record(kind, verb) {
            tracing::warn!(
                kind = kind.as_str(),
                verb = verb.as_str(),
                error = %err,
                "Audit record dropped"
            );
        }
    }
}
