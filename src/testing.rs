//! In-memory collaborators for driving the router without PostgreSQL.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::identity::{Identity, IdentityProvider};
use crate::favourites::repo::{FavouriteStore, StoreError};
use crate::favourites::repo_types::{Favourite, NewFavourite};
use crate::products::repo::ProductStore;
use crate::products::repo_types::Product;

/// Favourite store with the same referential checks as the real schema.
pub struct MemoryFavourites {
    inner: Mutex<Inner>,
}

struct Inner {
    users: HashSet<i64>,
    products: HashSet<i64>,
    rows: BTreeMap<i64, Favourite>,
    next_id: i64,
}

impl Inner {
    fn check_refs(&self, new: NewFavourite) -> Result<(), StoreError> {
        if !self.users.contains(&new.user_id) {
            return Err(StoreError::ForeignKey("user must exist".into()));
        }
        if !self.products.contains(&new.product_id) {
            return Err(StoreError::ForeignKey("product must exist".into()));
        }
        Ok(())
    }
}

impl MemoryFavourites {
    pub fn new(users: &[i64], products: &[i64]) -> Self {
        Self {
            inner: Mutex::new(Inner {
                users: users.iter().copied().collect(),
                products: products.iter().copied().collect(),
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn seed(&self, user_id: i64, product_id: i64) -> Favourite {
        let mut inner = self.inner.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let favourite = Favourite {
            id: inner.next_id,
            user_id,
            product_id,
            created_at: now,
            updated_at: now,
        };
        inner.next_id += 1;
        inner.rows.insert(favourite.id, favourite.clone());
        favourite
    }

    pub fn get(&self, id: i64) -> Option<Favourite> {
        self.inner.lock().unwrap().rows.get(&id).cloned()
    }

    pub fn find_by(&self, user_id: i64, product_id: i64) -> Option<Favourite> {
        self.inner
            .lock()
            .unwrap()
            .rows
            .values()
            .find(|f| f.user_id == user_id && f.product_id == product_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().rows.len()
    }
}

#[async_trait]
impl FavouriteStore for MemoryFavourites {
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Favourite>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rows
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Favourite>, StoreError> {
        Ok(self.get(id))
    }

    async fn insert(&self, new: NewFavourite) -> Result<Favourite, StoreError> {
        self.inner.lock().unwrap().check_refs(new)?;
        Ok(self.seed(new.user_id, new.product_id))
    }

    async fn update(&self, id: i64, new: NewFavourite) -> Result<Favourite, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.rows.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        inner.check_refs(new)?;
        let row = inner.rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        row.user_id = new.user_id;
        row.product_id = new.product_id;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(row.clone())
    }

    async fn delete_owned(&self, id: i64, user_id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.rows.get(&id) {
            Some(f) if f.user_id == user_id => {
                inner.rows.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Fixed set of `(identity, token)` pairs.
#[derive(Default)]
pub struct StaticIdentities {
    users: Vec<(Identity, String)>,
}

impl StaticIdentities {
    pub fn with(mut self, id: i64, email: &str, token: &str) -> Self {
        self.users.push((
            Identity {
                id,
                email: email.into(),
            },
            token.into(),
        ));
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentities {
    async fn authenticate(&self, email: &str, token: &str) -> anyhow::Result<Option<Identity>> {
        Ok(self
            .users
            .iter()
            .find(|(identity, t)| identity.email == email && t == token)
            .map(|(identity, _)| identity.clone()))
    }
}

/// Fixed product catalogue.
#[derive(Default)]
pub struct MemoryProducts {
    products: BTreeMap<i64, Product>,
}

impl MemoryProducts {
    pub fn with(mut self, id: i64, name: &str, type_id: i64) -> Self {
        self.products.insert(
            id,
            Product {
                id,
                name: name.into(),
                type_id,
            },
        );
        self
    }
}

#[async_trait]
impl ProductStore for MemoryProducts {
    async fn list(&self) -> anyhow::Result<Vec<Product>> {
        Ok(self.products.values().cloned().collect())
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<Product>> {
        Ok(self.products.get(&id).cloned())
    }
}
