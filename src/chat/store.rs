use std::collections::HashSet;

use crate::common::{MessageOrigin, ServerTimestamp};

use super::message::{DisplayedMessage, normalize_content, normalize_sender};
use super::render::RenderHandle;

/// Quyết định của reconciler cho một tin nhắn đến từ server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Đã có entry mang timestamp này; không làm gì.
    Duplicate,
    /// Gộp vào entry pending tại vị trí này; cần cập nhật tại chỗ.
    Merged(usize),
    /// Thêm entry mới ở cuối; cần vẽ mới.
    Inserted(usize),
}

/// Danh sách tin nhắn đang hiển thị, theo thứ tự trên màn hình.
///
/// Chỉ chứa logic quyết định; việc vẽ do `ChatSession` thực hiện dựa trên
/// giá trị `Reconciliation` trả về.
#[derive(Debug, Default)]
pub struct MessageStore {
    entries: Vec<DisplayedMessage>,
    confirmed: HashSet<ServerTimestamp>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tạo entry pending cho tin vừa gửi. Trả về `None` nếu nội dung rỗng.
    pub fn submit_local(
        &mut self,
        sender: &str,
        content: &str,
        origin: MessageOrigin,
    ) -> Option<usize> {
        if content.trim().is_empty() {
            return None;
        }
        self.entries
            .push(DisplayedMessage::pending(sender, content, origin));
        Some(self.entries.len() - 1)
    }

    pub fn ingest_server_message(
        &mut self,
        sender: &str,
        content: &str,
        timestamp: ServerTimestamp,
        origin: MessageOrigin,
    ) -> Reconciliation {
        if self.confirmed.contains(&timestamp) {
            return Reconciliation::Duplicate;
        }

        let sender = normalize_sender(sender);
        let content = normalize_content(content);

        if let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.matches_pending(&sender, &content))
        {
            self.confirmed.insert(timestamp.clone());
            self.entries[index].confirm(timestamp);
            log::debug!("Merged server copy into pending entry #{index}");
            return Reconciliation::Merged(index);
        }

        self.confirmed.insert(timestamp.clone());
        self.entries.push(DisplayedMessage::confirmed(
            &sender, &content, timestamp, origin,
        ));
        Reconciliation::Inserted(self.entries.len() - 1)
    }

    pub fn attach_handle(&mut self, index: usize, handle: RenderHandle) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.render_handle = Some(handle);
        }
    }

    /// Xoá toàn bộ entry, trả về các render handle đã giải phóng.
    pub fn clear(&mut self) -> Vec<RenderHandle> {
        self.confirmed.clear();
        self.entries
            .drain(..)
            .filter_map(|entry| entry.render_handle)
            .collect()
    }

    pub fn get(&self, index: usize) -> Option<&DisplayedMessage> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplayedMessage> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_pending()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(raw: &str) -> ServerTimestamp {
        ServerTimestamp::new(raw)
    }

    #[test]
    fn ingesting_same_message_twice_keeps_one_entry() {
        let mut store = MessageStore::new();
        let first = store.ingest_server_message("bob", "yo", ts("t1"), MessageOrigin::Other);
        let second = store.ingest_server_message("bob", "yo", ts("t1"), MessageOrigin::Other);

        assert_eq!(first, Reconciliation::Inserted(0));
        assert_eq!(second, Reconciliation::Duplicate);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn server_copy_merges_into_pending_entry() {
        let mut store = MessageStore::new();
        let index = store
            .submit_local("alice", "hi", MessageOrigin::Own)
            .expect("non-empty content");

        let result = store.ingest_server_message("alice", "hi", ts("T"), MessageOrigin::Own);

        assert_eq!(result, Reconciliation::Merged(index));
        assert_eq!(store.len(), 1);
        let entry = store.get(index).unwrap();
        assert!(!entry.is_pending());
        assert_eq!(entry.timestamp(), Some(&ts("T")));
    }

    #[test]
    fn merge_compares_normalized_fields() {
        let mut store = MessageStore::new();
        store.submit_local(" alice ", "  hi\n", MessageOrigin::Own);

        let result = store.ingest_server_message("alice", "hi", ts("T"), MessageOrigin::Own);
        assert_eq!(result, Reconciliation::Merged(0));
    }

    #[test]
    fn different_sender_or_content_does_not_merge() {
        let mut store = MessageStore::new();
        store.submit_local("alice", "hi", MessageOrigin::Own);

        let from_bob = store.ingest_server_message("bob", "hi", ts("t1"), MessageOrigin::Other);
        let other_text =
            store.ingest_server_message("alice", "hello", ts("t2"), MessageOrigin::Own);

        assert_eq!(from_bob, Reconciliation::Inserted(1));
        assert_eq!(other_text, Reconciliation::Inserted(2));
        assert_eq!(store.len(), 3);
        assert!(store.get(0).unwrap().is_pending());
    }

    #[test]
    fn merged_entry_keeps_its_position() {
        let mut store = MessageStore::new();
        store.submit_local("alice", "first", MessageOrigin::Own);
        store.ingest_server_message("bob", "in between", ts("t1"), MessageOrigin::Other);

        let result = store.ingest_server_message("alice", "first", ts("t2"), MessageOrigin::Own);

        assert_eq!(result, Reconciliation::Merged(0));
        let contents: Vec<_> = store.iter().map(|entry| entry.content()).collect();
        assert_eq!(contents, vec!["first", "in between"]);
    }

    #[test]
    fn identical_messages_with_distinct_timestamps_both_insert() {
        let mut store = MessageStore::new();
        store.ingest_server_message("bob", "ping", ts("t1"), MessageOrigin::Other);
        store.ingest_server_message("bob", "ping", ts("t2"), MessageOrigin::Other);

        assert_eq!(store.len(), 2);
    }

    #[test]
    fn confirmed_entry_is_never_merged_again() {
        let mut store = MessageStore::new();
        store.submit_local("alice", "hi", MessageOrigin::Own);
        store.ingest_server_message("alice", "hi", ts("t1"), MessageOrigin::Own);

        let again = store.ingest_server_message("alice", "hi", ts("t2"), MessageOrigin::Own);

        assert_eq!(again, Reconciliation::Inserted(1));
        assert_eq!(store.get(0).unwrap().timestamp(), Some(&ts("t1")));
    }

    #[test]
    fn clear_drops_pending_entries_and_known_timestamps() {
        let mut store = MessageStore::new();
        let index = store.submit_local("alice", "hi", MessageOrigin::Own).unwrap();
        store.attach_handle(index, RenderHandle(7));
        store.ingest_server_message("bob", "yo", ts("t1"), MessageOrigin::Other);

        let released = store.clear();
        assert_eq!(released, vec![RenderHandle(7)]);
        assert!(store.is_empty());

        // Không còn entry pending nào để gộp, và t1 được coi là mới.
        let hi = store.ingest_server_message("alice", "hi", ts("t3"), MessageOrigin::Own);
        let yo = store.ingest_server_message("bob", "yo", ts("t1"), MessageOrigin::Other);
        assert_eq!(hi, Reconciliation::Inserted(0));
        assert_eq!(yo, Reconciliation::Inserted(1));
    }

    #[test]
    fn blank_local_message_is_rejected() {
        let mut store = MessageStore::new();
        assert_eq!(store.submit_local("alice", "   ", MessageOrigin::Own), None);
        assert!(store.is_empty());
    }

    #[test]
    fn pending_count_tracks_unconfirmed_entries() {
        let mut store = MessageStore::new();
        store.submit_local("alice", "one", MessageOrigin::Own);
        store.submit_local("alice", "two", MessageOrigin::Own);
        store.ingest_server_message("alice", "one", ts("t1"), MessageOrigin::Own);

        assert_eq!(store.pending_count(), 1);
    }
}
