//! 메모리 기반 사용자 저장소.
//!
//! 테스트와 DB 없는 로컬 실행용. 프로세스 종료 시 데이터가 사라집니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::users::{NewUser, StoreError, UserRecord, UserStore};

#[derive(Default)]
struct Inner {
    users: HashMap<String, UserRecord>,
    next_id: i64,
}

/// 메모리 사용자 저장소
#[derive(Default)]
pub struct MemoryUserStore {
    inner: RwLock<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.inner.read().await.users.get(email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        inner.next_id += 1;
        let record = UserRecord {
            id: inner.next_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner.users.insert(record.email.clone(), record.clone());

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut users: Vec<UserRecord> = self.inner.read().await.users.values().cloned().collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }

    async fn delete_all(&self) -> Result<u64, StoreError> {
        let mut inner = self.inner.write().await;
        let count = inner.users.len() as u64;
        inner.users.clear();
        Ok(count)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
