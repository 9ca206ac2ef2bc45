mod versioned_schema;

pub use versioned_schema::{
    check_schema, ensure_schema, Column, ForeignKey, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
};
