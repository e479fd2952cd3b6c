use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{ContactMessage, Epaper, NewContactMessage, NewEpaper};
use super::{NewsStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    epapers: Vec<Epaper>,
    messages: Vec<ContactMessage>,
}

/// In-process store used when no `DATABASE_URL` is configured.
///
/// Holds everything behind one `RwLock`, so every operation is atomic with
/// respect to the others. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn ping(&self) -> Result<std::time::Duration, StoreError> {
        let start = std::time::Instant::now();
        let _tables = self.tables.read().await;
        Ok(start.elapsed())
    }

    async fn list_epapers(&self) -> Result<Vec<Epaper>, StoreError> {
        let tables = self.tables.read().await;
        let mut papers = tables.epapers.clone();
        papers.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(papers)
    }

    async fn list_dates(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let tables = self.tables.read().await;
        let mut dates: Vec<NaiveDate> = tables.epapers.iter().map(|p| p.date).collect();
        dates.sort_by(|a, b| b.cmp(a));
        Ok(dates)
    }

    async fn find_epaper_by_date(&self, date: NaiveDate) -> Result<Option<Epaper>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.epapers.iter().find(|p| p.date == date).cloned())
    }

    async fn create_epaper(&self, new: NewEpaper) -> Result<Epaper, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.epapers.iter().any(|p| p.date == new.date) {
            return Err(StoreError::DuplicateDate(new.date));
        }

        let now = Utc::now();
        let paper = Epaper {
            id: Uuid::new_v4(),
            date: new.date,
            pdf_url: new.pdf_url,
            file_id: new.file_id,
            file_name: new.file_name,
            file_size: new.file_size,
            uploaded_by: new.uploaded_by,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        tables.epapers.push(paper.clone());
        Ok(paper)
    }

    async fn delete_epaper(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.epapers.len();
        tables.epapers.retain(|p| p.id != id);
        Ok(tables.epapers.len() < before)
    }

    async fn increment_views(&self, id: Uuid) -> Result<Option<i64>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.epapers.iter_mut().find(|p| p.id == id).map(|p| {
            p.views += 1;
            p.views
        }))
    }

    async fn create_message(&self, new: NewContactMessage) -> Result<ContactMessage, StoreError> {
        let now = Utc::now();
        let message = ContactMessage {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            phone: new.phone,
            subject: new.subject,
            message: new.message,
            is_read: false,
            created_at: now,
            updated_at: now,
        };
        self.tables.write().await.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<ContactMessage>, StoreError> {
        let tables = self.tables.read().await;
        // Insertion order breaks ties between messages created in the same instant.
        Ok(tables.messages.iter().rev().cloned().collect())
    }

    async fn set_message_read(
        &self,
        id: Uuid,
        is_read: bool,
    ) -> Result<Option<ContactMessage>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.messages.iter_mut().find(|m| m.id == id).map(|m| {
            m.is_read = is_read;
            m.updated_at = Utc::now();
            m.clone()
        }))
    }

    async fn delete_message(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        let before = tables.messages.len();
        tables.messages.retain(|m| m.id != id);
        Ok(tables.messages.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_paper(date: &str) -> NewEpaper {
        NewEpaper {
            date: date.parse().unwrap(),
            pdf_url: format!("https://cdn.test/{date}.pdf"),
            file_id: format!("file-{date}"),
            file_name: format!("{date}.pdf"),
            file_size: Some(1024),
            uploaded_by: "admin".to_string(),
        }
    }

    fn new_message(name: &str) -> NewContactMessage {
        NewContactMessage {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: None,
            subject: None,
            message: "নমস্কার".to_string(),
        }
    }

    #[tokio::test]
    async fn test_dates_come_back_descending() {
        let store = MemoryStore::new();
        for date in ["2025-01-02", "2025-01-05", "2025-01-01"] {
            store.create_epaper(new_paper(date)).await.unwrap();
        }
        let dates: Vec<String> = store
            .list_dates()
            .await
            .unwrap()
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(dates, ["2025-01-05", "2025-01-02", "2025-01-01"]);

        let papers = store.list_epapers().await.unwrap();
        assert_eq!(papers[0].date.to_string(), "2025-01-05");
    }

    #[tokio::test]
    async fn test_second_paper_for_same_date_is_rejected() {
        let store = MemoryStore::new();
        store.create_epaper(new_paper("2025-02-10")).await.unwrap();
        let err = store.create_epaper(new_paper("2025-02-10")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateDate(_)));
        assert_eq!(store.list_epapers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_increment_views_is_monotonic() {
        let store = MemoryStore::new();
        let paper = store.create_epaper(new_paper("2025-02-10")).await.unwrap();
        assert_eq!(paper.views, 0);
        assert_eq!(store.increment_views(paper.id).await.unwrap(), Some(1));
        assert_eq!(store.increment_views(paper.id).await.unwrap(), Some(2));
        assert_eq!(store.increment_views(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_rows() {
        let store = MemoryStore::new();
        let paper = store.create_epaper(new_paper("2025-02-10")).await.unwrap();
        assert!(store.delete_epaper(paper.id).await.unwrap());
        assert!(!store.delete_epaper(paper.id).await.unwrap());

        let message = store.create_message(new_message("Rina")).await.unwrap();
        assert!(store.delete_message(message.id).await.unwrap());
        assert!(!store.delete_message(message.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_messages_newest_first_and_toggle_read() {
        let store = MemoryStore::new();
        let first = store.create_message(new_message("Rina")).await.unwrap();
        let second = store.create_message(new_message("Amit")).await.unwrap();
        assert!(!first.is_read);

        let listed = store.list_messages().await.unwrap();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        let updated = store.set_message_read(first.id, true).await.unwrap().unwrap();
        assert!(updated.is_read);
        let updated = store.set_message_read(first.id, false).await.unwrap().unwrap();
        assert!(!updated.is_read);
        assert!(store
            .set_message_read(Uuid::new_v4(), true)
            .await
            .unwrap()
            .is_none());
    }
}
