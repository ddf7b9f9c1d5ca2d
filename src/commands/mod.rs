//! 命令层：静态规格表、参数校验、强类型请求与参数 Schema

pub mod requests;
pub mod schema;
pub mod spec;

pub use requests::{
    CrawlRequest, JobStatusRequest, MapRequest, ScrapeRequest, TranscriptMode, TranscriptRequest,
    ValidatedCommand,
};
pub use schema::{command_schemas_json, parameters_schema};
pub use spec::{find_spec, CommandKind, CommandSpec, FieldSpec, FieldType, COMMAND_SPECS};
