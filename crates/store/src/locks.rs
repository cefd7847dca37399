use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use rolecall_core::domain::menu::{GuildId, MenuId, UserId};

/// Async mutex table keyed by identity string. Handler sequences that
/// read-modify-write the same menu, or mutate the same member's roles, take
/// the matching guard first, giving single-writer semantics per identity
/// while leaving unrelated identities free to interleave. Entries are never
/// evicted; the table grows with the distinct identities seen.
#[derive(Default)]
pub struct KeyedLocks {
    table: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, key: String) -> OwnedMutexGuard<()> {
        let slot = {
            let mut table = self.table.lock().await;
            table.entry(key).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        slot.lock_owned().await
    }

    pub fn menu_key(menu_id: &MenuId) -> String {
        format!("menu:{menu_id}")
    }

    pub fn member_key(guild_id: &GuildId, user_id: &UserId) -> String {
        format!("member:{guild_id}:{user_id}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::KeyedLocks;

    #[tokio::test]
    async fn same_key_serializes_critical_sections() {
        let locks = Arc::new(KeyedLocks::new());
        let order = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let guard = locks.acquire("menu:m-1".to_owned()).await;

        let task_locks = locks.clone();
        let task_order = order.clone();
        let handle = tokio::spawn(async move {
            let _guard = task_locks.acquire("menu:m-1".to_owned()).await;
            task_order.lock().await.push("second");
        });

        tokio::task::yield_now().await;
        order.lock().await.push("first");
        drop(guard);

        handle.await.expect("task should finish");
        assert_eq!(*order.lock().await, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn different_keys_are_independent() {
        let locks = KeyedLocks::new();

        let _menu_guard = locks.acquire("menu:m-1".to_owned()).await;
        let _member_guard = locks.acquire("member:G1:U1".to_owned()).await;
    }

    #[test]
    fn key_builders_embed_both_identity_parts() {
        assert_eq!(KeyedLocks::menu_key(&"m-1".into()), "menu:m-1");
        assert_eq!(KeyedLocks::member_key(&"G1".into(), &"U1".into()), "member:G1:U1");
    }
}
