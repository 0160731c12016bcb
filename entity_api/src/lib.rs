use sea_orm::{DatabaseConnection, Value};
use std::collections::HashMap;

pub use entity::{connection_requests, connections, notifications, status, users, Id};

pub mod connection;
pub mod connection_request;
pub mod error;
pub mod notification;
pub mod query;
pub mod user;

/// `QueryFilterMap` is a data structure that serves as a bridge for translating filter parameters
/// between different layers of the application. It is essentially a wrapper around a `HashMap`
/// where the keys are filter parameter names (as `String`) and the values are optional `Value` types
/// from `sea_orm`.
///
/// This structure is particularly useful in scenarios where you need to pass filter parameters
/// from a web request down to the database query layer in a type-safe and organized manner.
///
/// # Example
///
/// ```
/// use sea_orm::Value;
/// use entity_api::QueryFilterMap;
///
/// let mut query_filter_map = QueryFilterMap::new();
/// query_filter_map.insert("recipient_member_id".to_string(), Some(Value::String(Some(Box::new("SPC-20240915-a1b2c3".to_string())))));
/// let filter_value = query_filter_map.get("recipient_member_id");
/// ```
pub struct QueryFilterMap {
    map: HashMap<String, Option<Value>>,
}

impl QueryFilterMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        // HashMap.get returns an Option and so we need to "flatten" this to a single Option
        self.map
            .get(key)
            .and_then(|inner_option| inner_option.clone())
    }

    pub fn insert(&mut self, key: String, value: Option<Value>) {
        self.map.insert(key, value);
    }
}

impl Default for QueryFilterMap {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn seed_database(db: &DatabaseConnection) {
    use password_auth::generate_hash;

    let now = chrono::Utc::now();
    // create() ignores id, member_id and the timestamps and fills them itself
    let seed_user = |username: &str, email: &str, full_name: &str, contact: &str, company: &str| {
        users::Model {
            id: Id::default(),
            member_id: String::new(),
            username: username.to_owned(),
            email: email.to_owned(),
            full_name: full_name.to_owned(),
            contact: contact.to_owned(),
            company_name: company.to_owned(),
            password: generate_hash("password"),
            created_at: now.into(),
            updated_at: now.into(),
        }
    };

    let alice = user::create(
        db,
        seed_user(
            "alice",
            "alice@spcconnect.com",
            "Alice Nguyen",
            "+15550100",
            "Northwind Analytics",
        ),
    )
    .await
    .unwrap();

    let bob = user::create(
        db,
        seed_user(
            "bob",
            "bob@spcconnect.com",
            "Bob Castellano",
            "+15550101",
            "Castellano Consulting",
        ),
    )
    .await
    .unwrap();

    // Carol has no pending activity yet
    user::create(
        db,
        seed_user("carol", "carol@spcconnect.com", "Carol Diaz", "+15550102", ""),
    )
    .await
    .unwrap();

    // Alice has reached out to Bob
    connection_request::create(
        db,
        alice.member_id.clone(),
        bob.member_id.clone(),
        "We met at the platform engineering meetup last week.".to_owned(),
    )
    .await
    .unwrap();
}
