// --- File: crates/glowbook_mailing/src/service.rs ---
use glowbook_common::services::{BoxFuture, MarketingService};
use glowbook_common::ContactDetails;

use crate::client::KlaviyoClient;
use crate::error::MailingError;

impl MarketingService for KlaviyoClient {
    type Error = MailingError;

    fn subscribe(
        &self,
        contact: &ContactDetails,
        source: Option<&str>,
    ) -> BoxFuture<'_, (), Self::Error> {
        let contact = contact.clone();
        let source = source.map(str::to_string);
        Box::pin(async move {
            self.import_profile(&contact, source.as_deref()).await?;
            self.subscribe_to_list(&contact.email, source.as_deref())
                .await
        })
    }
}
