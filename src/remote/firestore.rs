//! Warehouse directory backed by the Firestore REST API.
//!
//! Two reads per run:
//!
//! 1. a collection-group query over `orgUsers` for the user's memberships
//! 2. a (paged) listing of `organizations/{orgId}/warehouses`
//!
//! Firestore documents come back with typed values (`{"stringValue": "..."}`);
//! they are flattened to plain JSON before being deserialized into `Warehouse`.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, instrument, warn};

use crate::config::{OrgSelection, ServiceConfig};
use crate::domain::{Principal, Warehouse};
use crate::error::WarehouseLookupError;
use crate::remote::{WarehouseDirectory, body_text};

const BASE_URL: &str = "https://firestore.googleapis.com";
const MEMBERSHIP_COLLECTION: &str = "orgUsers";
const PAGE_SIZE: usize = 300;

pub struct FirestoreDirectory {
    client: Client,
    project_id: String,
    base_url: String,
    org_selection: OrgSelection,
}

impl FirestoreDirectory {
    pub fn new(client: Client, config: &ServiceConfig) -> Self {
        Self {
            client,
            project_id: config.firebase_project_id.clone(),
            base_url: BASE_URL.to_string(),
            org_selection: config.org_selection,
        }
    }

    /// Point the client at another host (e.g. the Firestore emulator).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn documents_root(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            self.base_url.trim_end_matches('/'),
            self.project_id
        )
    }

    fn membership_org_ids(&self, principal: &Principal) -> Result<Vec<String>, WarehouseLookupError> {
        let resp = self
            .client
            .post(format!("{}:runQuery", self.documents_root()))
            .bearer_auth(&principal.token)
            .json(&membership_query(&principal.uid))
            .send()
            .map_err(|e| WarehouseLookupError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WarehouseLookupError::Status {
                status: status.as_u16(),
                body: body_text(resp),
            });
        }

        let rows: Vec<RunQueryRow> = resp
            .json()
            .map_err(|e| WarehouseLookupError::Decode(e.to_string()))?;

        let mut org_ids = Vec::new();
        for doc in rows.into_iter().filter_map(|row| row.document) {
            let data = decode_fields(doc.fields);
            match data.get("orgId").and_then(Value::as_str) {
                Some(org_id) => org_ids.push(org_id.to_string()),
                None => warn!(document = %doc.name, "membership document has no orgId; ignoring"),
            }
        }
        Ok(org_ids)
    }

    fn warehouses_of(&self, principal: &Principal, org_id: &str) -> Result<Vec<Warehouse>, WarehouseLookupError> {
        let url = format!("{}/organizations/{org_id}/warehouses", self.documents_root());
        let mut warehouses = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut req = self
                .client
                .get(&url)
                .bearer_auth(&principal.token)
                .query(&[("pageSize", PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                req = req.query(&[("pageToken", token)]);
            }

            let resp = req
                .send()
                .map_err(|e| WarehouseLookupError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(WarehouseLookupError::Status {
                    status: status.as_u16(),
                    body: body_text(resp),
                });
            }

            let page: ListDocumentsPage = resp
                .json()
                .map_err(|e| WarehouseLookupError::Decode(e.to_string()))?;

            for doc in page.documents {
                warehouses.push(warehouse_from_document(doc)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(warehouses)
    }
}

impl WarehouseDirectory for FirestoreDirectory {
    #[instrument(skip_all, fields(uid = %principal.uid))]
    fn list_warehouses(&self, principal: &Principal) -> Result<Vec<Warehouse>, WarehouseLookupError> {
        let org_ids = self.membership_org_ids(principal)?;
        let org_id = select_organization(&principal.uid, org_ids, self.org_selection)?;
        info!(org_id = %org_id, "resolved organization");

        let warehouses = self.warehouses_of(principal, &org_id)?;
        debug!(count = warehouses.len(), "loaded warehouses");
        Ok(warehouses)
    }
}

/// Pick the single organization to load warehouses from.
///
/// Repeated memberships of the same organization count once.
pub fn select_organization(
    uid: &str,
    org_ids: Vec<String>,
    policy: OrgSelection,
) -> Result<String, WarehouseLookupError> {
    let mut distinct: Vec<String> = Vec::with_capacity(org_ids.len());
    for id in org_ids {
        if !distinct.contains(&id) {
            distinct.push(id);
        }
    }

    if distinct.len() > 1 {
        match policy {
            OrgSelection::Reject => {
                return Err(WarehouseLookupError::AmbiguousOrganization {
                    uid: uid.to_string(),
                    org_ids: distinct,
                });
            }
            OrgSelection::First | OrgSelection::Last => {
                warn!(uid, candidates = ?distinct, policy = ?policy, "user belongs to several organizations");
            }
        }
    }

    let chosen = match policy {
        OrgSelection::Last => distinct.pop(),
        OrgSelection::Reject | OrgSelection::First => distinct.into_iter().next(),
    };
    chosen.ok_or_else(|| WarehouseLookupError::NoOrganization(uid.to_string()))
}

fn membership_query(uid: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": MEMBERSHIP_COLLECTION, "allDescendants": true }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": "userId" },
                    "op": "EQUAL",
                    "value": { "stringValue": uid }
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct RunQueryRow {
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsPage {
    #[serde(default)]
    documents: Vec<Document>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

/// Warehouse documents normally carry their own `id`; fall back to the document id.
fn warehouse_from_document(doc: Document) -> Result<Warehouse, WarehouseLookupError> {
    let mut data = decode_fields(doc.fields);
    if data.get("id").is_none_or(Value::is_null) {
        let doc_id = doc.name.rsplit('/').next().unwrap_or_default().to_string();
        data.insert("id".to_string(), Value::String(doc_id));
    }
    serde_json::from_value(Value::Object(data))
        .map_err(|e| WarehouseLookupError::Decode(format!("{}: {e}", doc.name)))
}

fn decode_fields(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .map(|(k, v)| (k, decode_value(v)))
        .collect()
}

/// Flatten one Firestore typed value into plain JSON.
pub fn decode_value(value: Value) -> Value {
    let Value::Object(mut typed) = value else {
        return value;
    };

    if let Some(v) = typed.remove("stringValue") {
        return v;
    }
    if let Some(v) = typed.remove("integerValue") {
        // int64 travels as a string.
        return match v.as_str().and_then(|s| s.parse::<i64>().ok()) {
            Some(n) => Value::from(n),
            None => v,
        };
    }
    if let Some(v) = typed.remove("doubleValue") {
        return v;
    }
    if let Some(v) = typed.remove("booleanValue") {
        return v;
    }
    if typed.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(v) = typed.remove("timestampValue") {
        return v;
    }
    if let Some(v) = typed.remove("referenceValue") {
        return v;
    }
    if let Some(v) = typed.remove("geoPointValue") {
        return v;
    }
    if let Some(Value::Object(mut map)) = typed.remove("mapValue") {
        let fields = match map.remove("fields") {
            Some(Value::Object(fields)) => fields,
            _ => Map::new(),
        };
        return Value::Object(decode_fields(fields));
    }
    if let Some(Value::Object(mut arr)) = typed.remove("arrayValue") {
        let values = match arr.remove("values") {
            Some(Value::Array(values)) => values,
            _ => Vec::new(),
        };
        return Value::Array(values.into_iter().map(decode_value).collect());
    }

    Value::Object(typed)
}
