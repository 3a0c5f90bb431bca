use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_dynamodb as ddb;
use aws_sdk_dynamodb::error::ProvideErrorMetadata; // for .code()
use ddb::types::AttributeValue as Av;

use super::{LinkStore, StoreError};
use crate::config::Config;
use crate::model::ShortLinkRecord;

const CONDITION_FAILED: &str = "ConditionalCheckFailedException";

/// `LinkStore` over a DynamoDB table whose partition key is `short_code` (S).
#[derive(Clone)]
pub struct DynamoStore {
    ddb: ddb::Client,
    table: String,
}

impl DynamoStore {
    pub fn new(ddb: ddb::Client, table: impl Into<String>) -> Self {
        Self {
            ddb,
            table: table.into(),
        }
    }

    /// Builds the client from the default credential chain, pinned to
    /// `table_region` when the table lives outside the function's region.
    pub async fn from_config(cfg: &Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &cfg.table_region {
            loader = loader.region(Region::new(region.clone()));
        }
        let conf = loader.load().await;
        Self::new(ddb::Client::new(&conf), cfg.table_name.clone())
    }
}

fn map_ddb_err<E: ProvideErrorMetadata + std::fmt::Display>(e: E) -> StoreError {
    let msg = e.message().map(str::to_string).unwrap_or_else(|| e.to_string());
    StoreError::Backend(msg)
}

fn num(item: &HashMap<String, Av>, k: &str) -> Option<i64> {
    item.get(k)
        .and_then(|v| v.as_n().ok())
        .and_then(|s| s.parse::<i64>().ok())
}

fn record_from_item(item: &HashMap<String, Av>) -> Result<ShortLinkRecord, StoreError> {
    let text = |k: &str| {
        item.get(k)
            .and_then(|v| v.as_s().ok())
            .cloned()
            .ok_or_else(|| StoreError::Backend(format!("item is missing string attribute {k}")))
    };
    Ok(ShortLinkRecord {
        short_code: text("short_code")?,
        long_url: text("long_url")?,
        created_at: num(item, "created_at").unwrap_or(0),
        clicks: num(item, "clicks").map_or(0, |n| n.max(0) as u64),
        last_accessed: num(item, "last_accessed"),
    })
}

#[async_trait]
impl LinkStore for DynamoStore {
    async fn get(&self, code: &str) -> Result<Option<ShortLinkRecord>, StoreError> {
        let r = self
            .ddb
            .get_item()
            .table_name(&self.table)
            .key("short_code", Av::S(code.to_string()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(table=%self.table, err_code=?e.code(), err_msg=?e.message(), "DDB GetItem failed");
                map_ddb_err(e)
            })?;

        r.item.as_ref().map(record_from_item).transpose()
    }

    async fn put_if_absent(&self, record: &ShortLinkRecord) -> Result<(), StoreError> {
        let r = self
            .ddb
            .put_item()
            .table_name(&self.table)
            .item("short_code", Av::S(record.short_code.clone()))
            .item("long_url", Av::S(record.long_url.clone()))
            .item("created_at", Av::N(record.created_at.to_string()))
            .condition_expression("attribute_not_exists(short_code)")
            .send()
            .await;

        match r {
            Ok(_) => Ok(()),
            Err(e) if e.code() == Some(CONDITION_FAILED) => {
                Err(StoreError::Conflict(record.short_code.clone()))
            }
            Err(e) => {
                tracing::error!(table=%self.table, err_code=?e.code(), err_msg=?e.message(), "DDB PutItem failed");
                Err(map_ddb_err(e))
            }
        }
    }

    async fn record_visit(&self, code: &str, at: i64) -> Result<(), StoreError> {
        // The existence condition keeps a late update from resurrecting a row
        // that was deleted between the read and this write.
        self.ddb
            .update_item()
            .table_name(&self.table)
            .key("short_code", Av::S(code.to_string()))
            .update_expression("ADD clicks :one SET last_accessed = :ts")
            .condition_expression("attribute_exists(short_code)")
            .expression_attribute_values(":one", Av::N("1".into()))
            .expression_attribute_values(":ts", Av::N(at.to_string()))
            .send()
            .await
            .map_err(map_ddb_err)?;
        Ok(())
    }
}
