mod versioned_schema;

pub use versioned_schema::{
    quote_ident, Column, SqlType, Table, VersionedSchema, BASE_DB_VERSION,
};
