//! Customer reconciliation, including buyer identity resolution for orders.

use std::sync::Arc;

use tracing::{debug, info};

use storebridge_domain::{
    BridgeError, BuyerInfo, CustomerMapping, LocalCustomer, RemoteCustomer, Result,
};

use crate::hooks::WriteOrigin;
use crate::sync::ports::{
    CustomerMappingRepository, LocalStore, RemoteGateway, SettingsProvider,
};
use crate::sync::{unix_now, SyncOutcome};

/// Reconciles customers between the ERP and the storefront contact list.
pub struct CustomerSyncService {
    mappings: Arc<dyn CustomerMappingRepository>,
    gateway: Arc<dyn RemoteGateway>,
    local: Arc<dyn LocalStore>,
    settings: Arc<dyn SettingsProvider>,
}

impl CustomerSyncService {
    pub fn new(
        mappings: Arc<dyn CustomerMappingRepository>,
        gateway: Arc<dyn RemoteGateway>,
        local: Arc<dyn LocalStore>,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self { mappings, gateway, local, settings }
    }

    /// Push a local customer to the platform, creating the remote contact
    /// and the mapping on first sight.
    pub async fn sync_to_remote(&self, local_id: &str) -> Result<SyncOutcome> {
        let customer = self
            .local
            .get_customer(local_id)
            .await?
            .ok_or_else(|| BridgeError::NotFound(format!("customer {local_id}")))?;

        match self.mappings.get_by_local_id(local_id).await? {
            Some(mut mapping) => {
                if !mapping.sync_direction.allows_push() {
                    return Ok(SyncOutcome::skipped("direction excludes local-to-remote"));
                }
                let pushed =
                    self.gateway.update_customer(&mapping.remote_customer_id, &customer).await;
                match pushed {
                    Ok(()) => {
                        mapping.local_name = customer.name.clone();
                        mapping.local_email = customer.email.clone();
                        mapping.local_phone = customer.phone.clone();
                        mapping.mark_synced(unix_now());
                        self.mappings.update(&mapping).await?;
                        Ok(SyncOutcome::Synced)
                    }
                    Err(err) => {
                        if !err.is_transient() {
                            mapping.mark_error(&err.to_string(), unix_now());
                            self.mappings.update(&mapping).await?;
                        }
                        Err(err)
                    }
                }
            }
            None => {
                let created = self.gateway.create_customer(&customer).await?;
                let mut mapping =
                    CustomerMapping::new(local_id, &created.id, &customer.name, unix_now());
                mapping.local_email = customer.email.clone();
                mapping.local_phone = customer.phone.clone();
                mapping.remote_first_name = created.first_name.clone();
                mapping.remote_last_name = created.last_name.clone();
                mapping.remote_email = created.email.clone();
                mapping.mark_synced(unix_now());
                self.mappings.insert(&mapping).await?;
                info!(local_id, remote_id = %created.id, "customer created remotely");
                Ok(SyncOutcome::Synced)
            }
        }
    }

    /// Fetch a remote contact and apply it locally.
    pub async fn sync_from_remote(&self, remote_id: &str) -> Result<SyncOutcome> {
        match self.gateway.get_customer(remote_id).await? {
            Some(customer) => self.apply_remote(&customer).await,
            None => Ok(SyncOutcome::skipped("remote contact missing")),
        }
    }

    /// Apply an already-normalized remote contact to the local side.
    pub async fn apply_remote(&self, remote: &RemoteCustomer) -> Result<SyncOutcome> {
        let settings = self.settings.settings().await?;

        match self.mappings.get_by_remote_id(&remote.id).await? {
            Some(mut mapping) => {
                if !mapping.sync_direction.allows_pull() {
                    return Ok(SyncOutcome::skipped("direction excludes remote-to-local"));
                }
                let Some(mut customer) = self.local.get_customer(&mapping.local_id).await? else {
                    mapping.mark_error("local customer missing", unix_now());
                    self.mappings.update(&mapping).await?;
                    return Ok(SyncOutcome::skipped("local customer missing"));
                };
                customer.name = remote.display_name();
                customer.email = remote.email.clone().or(customer.email);
                customer.phone = remote.phone.clone().or(customer.phone);
                self.local.update_customer(&customer, WriteOrigin::RemoteSync).await?;

                mapping.remote_first_name = remote.first_name.clone();
                mapping.remote_last_name = remote.last_name.clone();
                mapping.remote_email = remote.email.clone();
                mapping.remote_phone = remote.phone.clone();
                mapping.local_name = customer.name.clone();
                mapping.mark_synced(unix_now());
                self.mappings.update(&mapping).await?;
                Ok(SyncOutcome::Synced)
            }
            None => {
                if !settings.auto_create_customers {
                    debug!(remote_id = %remote.id, "auto-create disabled; skipping contact");
                    return Ok(SyncOutcome::skipped("auto-create customers disabled"));
                }
                let local_id = self.create_local(remote, &settings).await?;
                let mut mapping =
                    CustomerMapping::new(&local_id, &remote.id, &remote.display_name(), unix_now());
                mapping.remote_first_name = remote.first_name.clone();
                mapping.remote_last_name = remote.last_name.clone();
                mapping.remote_email = remote.email.clone();
                mapping.remote_phone = remote.phone.clone();
                mapping.local_email = remote.email.clone();
                mapping.mark_synced(unix_now());
                self.mappings.insert(&mapping).await?;
                Ok(SyncOutcome::Synced)
            }
        }
    }

    /// Resolve an order's buyer to a local customer id.
    ///
    /// Resolution order: an existing mapping for the buyer's contact id,
    /// then an exact email match against local customers, then auto-create.
    /// Email matching is what keeps a repeat buyer from being duplicated
    /// across checkout webhooks.
    pub async fn resolve_buyer(&self, buyer: &BuyerInfo) -> Result<String> {
        if let Some(contact_id) = &buyer.contact_id {
            if let Some(mapping) = self.mappings.get_by_remote_id(contact_id).await? {
                return Ok(mapping.local_id);
            }
        }

        if let Some(email) = &buyer.email {
            if let Some(existing) = self.local.find_customer_by_email(email).await? {
                self.link_existing(buyer, &existing).await?;
                return Ok(existing.id);
            }
        }

        let settings = self.settings.settings().await?;
        if !settings.auto_create_customers {
            return Err(BridgeError::Validation(
                "buyer has no local customer and auto-create is disabled".to_string(),
            ));
        }

        let remote = RemoteCustomer {
            id: buyer.contact_id.clone().unwrap_or_default(),
            first_name: buyer.first_name.clone(),
            last_name: buyer.last_name.clone(),
            email: buyer.email.clone(),
            phone: None,
        };
        let local_id = self.create_local(&remote, &settings).await?;

        if let Some(contact_id) = &buyer.contact_id {
            let mut mapping =
                CustomerMapping::new(&local_id, contact_id, &remote.display_name(), unix_now());
            mapping.local_email = buyer.email.clone();
            mapping.remote_first_name = buyer.first_name.clone();
            mapping.remote_last_name = buyer.last_name.clone();
            mapping.remote_email = buyer.email.clone();
            mapping.mark_synced(unix_now());
            self.mappings.insert(&mapping).await?;
        }
        Ok(local_id)
    }

    async fn link_existing(&self, buyer: &BuyerInfo, existing: &LocalCustomer) -> Result<()> {
        let Some(contact_id) = &buyer.contact_id else {
            return Ok(());
        };
        if self.mappings.get_by_local_id(&existing.id).await?.is_some() {
            return Ok(());
        }
        let mut mapping =
            CustomerMapping::new(&existing.id, contact_id, &existing.name, unix_now());
        mapping.local_email = existing.email.clone();
        mapping.remote_email = buyer.email.clone();
        mapping.mark_synced(unix_now());
        self.mappings.insert(&mapping).await
    }

    async fn create_local(
        &self,
        remote: &RemoteCustomer,
        settings: &storebridge_domain::BridgeSettings,
    ) -> Result<String> {
        let customer = LocalCustomer {
            id: String::new(),
            name: remote.display_name(),
            email: remote.email.clone(),
            phone: remote.phone.clone(),
            customer_group: settings.default_customer_group.clone(),
            territory: settings.default_territory.clone(),
        };
        self.local.create_customer(&customer, WriteOrigin::RemoteSync).await
    }
}
