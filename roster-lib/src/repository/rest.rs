use std::time::Duration;

use reqwest::{
    Method,
    blocking::{Client, RequestBuilder, Response},
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    model::{NewUser, UserId, UserPatch, UserRecord, UserSummary},
    repository::{
        config::RestConfig,
        store::{RecordStore, StoreError},
    },
};

/// Record store hosted behind a PostgREST compatible endpoint, e.g. a
/// Supabase project.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: UserId,
}

impl RestStore {
    pub fn new(cfg: &RestConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &cfg.api_key {
            let key_value = header_value(key)?;
            let bearer = header_value(&format!("Bearer {key}"))?;
            headers.insert("apikey", key_value);
            headers.insert(AUTHORIZATION, bearer);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!(
                "{}/rest/v1/{}",
                cfg.url.trim_end_matches('/'),
                cfg.table
            ),
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client.request(method, &self.endpoint)
    }

    fn id_filter(id: &UserId) -> (&'static str, String) {
        ("id", format!("eq.{id}"))
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value).map_err(|_| {
        StoreError::InvalidConfig("API key contains characters that are not valid in a header".into())
    })
}

/// Turn non-2xx responses into [`StoreError::Status`].
fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

impl RecordStore for RestStore {
    fn list_records(&self) -> Result<Vec<UserSummary>, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "id,name,email"), ("order", "created_at.asc")])
            .send()?;

        Ok(check(response)?.json()?)
    }

    fn get_record(&self, id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*".to_string()), Self::id_filter(id)])
            .send()?;

        let rows: Vec<UserRecord> = check(response)?.json()?;
        Ok(rows.into_iter().next())
    }

    fn insert_record(&self, user: &NewUser) -> Result<UserId, StoreError> {
        let response = self
            .request(Method::POST)
            .query(&[("select", "id")])
            .header("Prefer", "return=representation")
            .json(&[user])
            .send()?;

        let rows: Vec<InsertedRow> = check(response)?.json()?;
        let id = rows
            .into_iter()
            .next()
            .map(|row| row.id)
            .ok_or(StoreError::MissingId)?;

        debug!("Inserted user {id}");

        Ok(id)
    }

    fn update_record(&self, id: &UserId, patch: &UserPatch) -> Result<(), StoreError> {
        let response = self
            .request(Method::PATCH)
            .query(&[Self::id_filter(id)])
            .json(patch)
            .send()?;

        check(response)?;
        Ok(())
    }

    fn delete_record(&self, id: &UserId) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE)
            .query(&[Self::id_filter(id)])
            .send()?;

        check(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::model::Field;

    fn store(server: &MockServer) -> RestStore {
        RestStore::new(&RestConfig {
            url: server.base_url(),
            api_key: Some("anon-key".into()),
            table: "users".into(),
            timeout_secs: Some(5),
        })
        .unwrap()
    }

    #[test]
    fn test_list_orders_by_creation() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/users")
                .query_param("select", "id,name,email")
                .query_param("order", "created_at.asc")
                .header("apikey", "anon-key")
                .header("authorization", "Bearer anon-key");
            then.status(200).json_body(json!([
                {"id": "1", "name": "A", "email": "a@x.com"},
                {"id": "2", "name": "B", "email": "b@x.com"},
            ]));
        });

        let users = store(&server).list_records().unwrap();

        mock.assert();
        assert_eq!(users.len(), 2);
        assert_eq!(users.first().unwrap().name, "A");
    }

    #[test]
    fn test_get_absent_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/rest/v1/users")
                .query_param("id", "eq.missing");
            then.status(200).json_body(json!([]));
        });

        assert!(store(&server).get_record(&"missing".into()).unwrap().is_none());
    }

    #[test]
    fn test_insert_returns_new_id() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/rest/v1/users")
                .header("prefer", "return=representation")
                .json_body(json!([{"name": "A", "email": "a@x.com", "contact": "123"}]));
            then.status(201).json_body(json!([{"id": "new-id"}]));
        });

        let id = store(&server)
            .insert_record(&NewUser::new("A", "a@x.com", "123"))
            .unwrap();

        mock.assert();
        assert_eq!(id.as_str(), "new-id");
    }

    #[test]
    fn test_update_sends_only_patch() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/rest/v1/users")
                .query_param("id", "eq.u1")
                .header("content-type", "application/json")
                .json_body(json!({"course": "CS", "contact": ""}));
            then.status(204);
        });

        store(&server)
            .update_record(
                &"u1".into(),
                &UserPatch::new()
                    .text(Field::Course, "CS")
                    .clear(Field::Contact),
            )
            .unwrap();

        mock.assert();
    }

    #[test]
    fn test_error_status_is_surfaced() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/rest/v1/users");
            then.status(401).body("invalid api key");
        });

        let err = store(&server).delete_record(&"u1".into()).unwrap_err();

        assert!(matches!(err, StoreError::Status { status: 401, .. }));
    }
}
