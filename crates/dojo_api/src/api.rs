//! Named endpoint surface for front-end callers.
//!
//! # Responsibility
//! - Register the `dojos:*` functions with their query/mutation kind.
//! - Validate JSON arguments and dispatch them to `DojoService`.
//! - Wrap every outcome in an `ApiResponse` envelope.
//!
//! # Invariants
//! - Exported call functions never panic; failures become `ok=false`.
//! - Argument objects reject unknown fields.

use crate::config::ApiConfig;
use dojo_core::db::{open_db, DbError};
use dojo_core::{
    DojoId, DojoRepository, DojoService, MemberRepository, RepoError, SqliteDojoRepository,
};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Whether a function only reads or also writes the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    Query,
    Mutation,
}

impl FunctionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
        }
    }
}

/// One registered endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FunctionSpec {
    pub path: &'static str,
    pub kind: FunctionKind,
}

pub const LIST: &str = "dojos:list";
pub const GET: &str = "dojos:get";
pub const CREATE: &str = "dojos:create";
pub const UPDATE: &str = "dojos:update";
pub const REMOVE: &str = "dojos:remove";
pub const GET_GUEST_COUNTS: &str = "dojos:getGuestCounts";
pub const CLEAR_ALL: &str = "dojos:clearAll";

/// Every callable function, in registry order.
pub const FUNCTIONS: &[FunctionSpec] = &[
    FunctionSpec {
        path: LIST,
        kind: FunctionKind::Query,
    },
    FunctionSpec {
        path: GET,
        kind: FunctionKind::Query,
    },
    FunctionSpec {
        path: CREATE,
        kind: FunctionKind::Mutation,
    },
    FunctionSpec {
        path: UPDATE,
        kind: FunctionKind::Mutation,
    },
    FunctionSpec {
        path: REMOVE,
        kind: FunctionKind::Mutation,
    },
    FunctionSpec {
        path: GET_GUEST_COUNTS,
        kind: FunctionKind::Query,
    },
    FunctionSpec {
        path: CLEAR_ALL,
        kind: FunctionKind::Mutation,
    },
];

/// Looks up a registered function by path.
pub fn function_spec(path: &str) -> Option<&'static FunctionSpec> {
    FUNCTIONS.iter().find(|spec| spec.path == path)
}

/// Errors surfaced by endpoint dispatch.
#[derive(Debug)]
pub enum ApiError {
    /// No function is registered under this path.
    UnknownFunction(String),
    /// Arguments do not match the function's argument shape.
    InvalidArgs { path: String, message: String },
    /// Store open/bootstrap failure.
    Db(DbError),
    /// Repository failure, including not-found on writes.
    Repo(RepoError),
    /// Function output could not be encoded as JSON.
    Encode(serde_json::Error),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFunction(path) => write!(f, "unknown function `{path}`"),
            Self::InvalidArgs { path, message } => {
                write!(f, "invalid arguments for `{path}`: {message}")
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode result: {err}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result envelope returned by every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Function output on success, `null` otherwise.
    pub value: Value,
    /// Human-readable failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn success(value: Value) -> Self {
        Self {
            ok: true,
            value,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: Value::Null,
            error: Some(message.into()),
        }
    }

    fn from_result(path: &str, result: Result<Value, ApiError>) -> Self {
        match result {
            Ok(value) => {
                debug!("event=api_call module=api status=ok function={path}");
                Self::success(value)
            }
            Err(err) => {
                warn!("event=api_call module=api status=error function={path} error={err}");
                Self::failure(err.to_string())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NoArgs {}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IdArgs {
    id: DojoId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateArgs {
    name: String,
    #[serde(default)]
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateArgs {
    id: DojoId,
    name: String,
    #[serde(default)]
    location: Option<String>,
}

/// Calls one function against an injected service.
pub fn call_service<R: DojoRepository + MemberRepository>(
    service: &DojoService<R>,
    path: &str,
    args: Value,
) -> ApiResponse {
    ApiResponse::from_result(path, dispatch(service, path, args))
}

/// Calls one function against an already-open, migrated connection.
pub fn call(conn: &rusqlite::Connection, path: &str, args: Value) -> ApiResponse {
    let result = SqliteDojoRepository::try_new(conn)
        .map_err(ApiError::from)
        .and_then(|repo| dispatch(&DojoService::new(repo), path, args));
    ApiResponse::from_result(path, result)
}

/// Opens the configured store and calls one function.
pub fn call_with_config(config: &ApiConfig, path: &str, args: Value) -> ApiResponse {
    match open_db(&config.db_path) {
        Ok(conn) => call(&conn, path, args),
        Err(err) => ApiResponse::from_result(path, Err(ApiError::Db(err))),
    }
}

fn dispatch<R: DojoRepository + MemberRepository>(
    service: &DojoService<R>,
    path: &str,
    args: Value,
) -> Result<Value, ApiError> {
    let spec = function_spec(path).ok_or_else(|| ApiError::UnknownFunction(path.to_string()))?;

    match spec.path {
        LIST => {
            let NoArgs {} = parse_args::<NoArgs>(path, args)?;
            to_json(&service.list()?)
        }
        GET => {
            let IdArgs { id } = parse_args::<IdArgs>(path, args)?;
            to_json(&service.get(id)?)
        }
        CREATE => {
            let CreateArgs { name, location } = parse_args::<CreateArgs>(path, args)?;
            let id = service.create(name, location)?;
            Ok(Value::String(id.to_string()))
        }
        UPDATE => {
            let UpdateArgs { id, name, location } = parse_args::<UpdateArgs>(path, args)?;
            service.update(id, &name, location.as_deref())?;
            Ok(Value::Null)
        }
        REMOVE => {
            let IdArgs { id } = parse_args::<IdArgs>(path, args)?;
            service.remove(id)?;
            Ok(Value::Null)
        }
        GET_GUEST_COUNTS => {
            let NoArgs {} = parse_args::<NoArgs>(path, args)?;
            to_json(&service.guest_counts()?)
        }
        CLEAR_ALL => {
            let NoArgs {} = parse_args::<NoArgs>(path, args)?;
            to_json(&service.clear_all()?)
        }
        other => Err(ApiError::UnknownFunction(other.to_string())),
    }
}

fn parse_args<T: DeserializeOwned>(path: &str, args: Value) -> Result<T, ApiError> {
    let args = if args.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|err| ApiError::InvalidArgs {
        path: path.to_string(),
        message: err.to_string(),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(ApiError::Encode)
}

#[cfg(test)]
mod tests {
    use super::{
        call, call_service, call_with_config, function_spec, FunctionKind, CLEAR_ALL, CREATE,
        FUNCTIONS, GET, GET_GUEST_COUNTS, LIST, REMOVE, UPDATE,
    };
    use crate::config::ApiConfig;
    use dojo_core::db::open_db_in_memory;
    use dojo_core::{DojoId, DojoService, MemoryDojoRepository};
    use serde_json::{json, Value};

    fn created_id(value: &Value) -> DojoId {
        value
            .as_str()
            .expect("create should return id string")
            .parse()
            .expect("id should be a uuid")
    }

    #[test]
    fn registry_tags_reads_as_queries_and_writes_as_mutations() {
        let queries = FUNCTIONS
            .iter()
            .filter(|spec| spec.kind == FunctionKind::Query)
            .map(|spec| spec.path)
            .collect::<Vec<_>>();
        assert_eq!(queries, vec![LIST, GET, GET_GUEST_COUNTS]);
        assert_eq!(
            function_spec(CLEAR_ALL).map(|spec| spec.kind),
            Some(FunctionKind::Mutation)
        );
        assert!(function_spec("dojos:drop").is_none());
    }

    #[test]
    fn create_get_update_roundtrip_through_endpoints() {
        let conn = open_db_in_memory().unwrap();

        let created = call(&conn, CREATE, json!({ "name": "Hombu", "location": "Tokyo" }));
        assert!(created.ok, "{:?}", created.error);
        let id = created_id(&created.value);

        let updated = call(&conn, UPDATE, json!({ "id": id.to_string(), "name": "Aikikai" }));
        assert!(updated.ok, "{:?}", updated.error);
        assert_eq!(updated.value, Value::Null);

        let fetched = call(&conn, GET, json!({ "id": id.to_string() }));
        assert!(fetched.ok);
        assert_eq!(fetched.value["name"], "Aikikai");
        assert!(fetched.value.get("location").is_none());
        assert!(fetched.value["createdAt"].is_i64());
    }

    #[test]
    fn get_missing_returns_null_value() {
        let conn = open_db_in_memory().unwrap();
        let response = call(&conn, GET, json!({ "id": DojoId::new_v4().to_string() }));
        assert!(response.ok);
        assert_eq!(response.value, Value::Null);
    }

    #[test]
    fn update_and_remove_missing_report_not_found() {
        let conn = open_db_in_memory().unwrap();
        let missing = DojoId::new_v4().to_string();

        let updated = call(&conn, UPDATE, json!({ "id": missing, "name": "x" }));
        assert!(!updated.ok);
        assert!(updated.error.unwrap().contains("dojo not found"));

        let removed = call(&conn, REMOVE, json!({ "id": missing }));
        assert!(!removed.ok);
        assert!(removed.error.unwrap().contains("dojo not found"));
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        let conn = open_db_in_memory().unwrap();

        let wrong_type = call(&conn, CREATE, json!({ "name": 42 }));
        assert!(!wrong_type.ok);
        assert!(wrong_type.error.unwrap().contains("invalid arguments"));

        let bad_id = call(&conn, GET, json!({ "id": "not-a-uuid" }));
        assert!(!bad_id.ok);

        let extra_field = call(&conn, LIST, json!({ "limit": 10 }));
        assert!(!extra_field.ok);

        let unknown = call(&conn, "dojos:truncate", Value::Null);
        assert!(!unknown.ok);
        assert!(unknown.error.unwrap().contains("unknown function"));
    }

    #[test]
    fn clear_all_and_guest_counts_shapes() {
        let service = DojoService::new(MemoryDojoRepository::new());
        let dojo = service.create("Counted", None).unwrap();
        service.create_member("guest", Some(dojo), true).unwrap();
        service.create_member("walk-in", None, true).unwrap();

        let counts = call_service(&service, GET_GUEST_COUNTS, Value::Null);
        assert!(counts.ok);
        assert_eq!(counts.value, json!({ (dojo.to_string()): 1, "none": 1 }));

        let cleared = call_service(&service, CLEAR_ALL, json!({}));
        assert_eq!(cleared.value, json!({ "deleted": 1 }));

        let listed = call_service(&service, LIST, Value::Null);
        assert_eq!(listed.value, json!([]));
    }

    #[test]
    fn call_with_config_opens_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("api.sqlite3");
        let config = ApiConfig::from_lookup(|key| {
            (key == crate::config::DB_PATH_ENV).then(|| db_path.display().to_string())
        });

        let created = call_with_config(&config, CREATE, json!({ "name": "On disk" }));
        assert!(created.ok, "{:?}", created.error);

        let listed = call_with_config(&config, LIST, Value::Null);
        assert_eq!(listed.value.as_array().map(Vec::len), Some(1));
        assert!(db_path.exists());
    }
}
