use super::IAllowedContactRepo;
use crate::repos::shared::inmemory_repo::*;
use lembra_domain::{AllowedContact, ID};
use std::sync::Mutex;

pub struct InMemoryAllowedContactRepo {
    contacts: Mutex<Vec<AllowedContact>>,
}

impl InMemoryAllowedContactRepo {
    pub fn new() -> Self {
        Self {
            contacts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl IAllowedContactRepo for InMemoryAllowedContactRepo {
    async fn insert(&self, contact: &AllowedContact) -> anyhow::Result<()> {
        if !self
            .is_allowed(&contact.user_id, &contact.contact_number)
            .await
        {
            insert(contact, &self.contacts);
        }
        Ok(())
    }

    async fn delete(&self, user_id: &ID, contact_number: &str) -> bool {
        delete_by(&self.contacts, |contact| {
            contact.user_id == *user_id && contact.contact_number == contact_number
        }) > 0
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<AllowedContact> {
        find_by(&self.contacts, |contact| contact.user_id == *user_id)
    }

    async fn is_allowed(&self, user_id: &ID, contact_number: &str) -> bool {
        !find_by(&self.contacts, |contact| {
            contact.user_id == *user_id && contact.contact_number == contact_number
        })
        .is_empty()
    }
}
