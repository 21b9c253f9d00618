//! SQL Server backend on a `bb8` pool of `tiberius` clients.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use bb8::Pool;
use bb8_tiberius::ConnectionManager;
use tiberius::{AuthMethod, ColumnData, Config, EncryptionLevel, Row};

use super::{Backend, Connector, DbError};
use crate::cells::Cell;
use crate::config::DatabaseConfig;

type DbPool = Pool<ConnectionManager>;

const ACTIVE_CELLS_QUERY: &str =
    "SELECT Number AS number, StatusId AS status FROM dbo.tb_Cells WHERE StatusId != 0 ORDER BY Number";

/// Build the driver config from our connection parameters.
pub fn build_tiberius_config(config: &DatabaseConfig) -> Config {
    let mut sql_config = Config::new();
    sql_config.host(&config.host);
    sql_config.port(config.port);
    sql_config.database(&config.database);
    sql_config.application_name(env!("CARGO_PKG_NAME"));
    sql_config.authentication(AuthMethod::sql_server(&config.user, &config.password));

    sql_config.encryption(if config.encrypt {
        EncryptionLevel::Required
    } else {
        EncryptionLevel::Off
    });

    if config.trust_server_certificate {
        sql_config.trust_cert();
    }

    sql_config
}

/// Connects to SQL Server.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlConnector;

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self, config: &DatabaseConfig) -> Result<Arc<dyn Backend>, DbError> {
        let manager = ConnectionManager::new(build_tiberius_config(config));

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build(manager)
            .await
            .map_err(|e| DbError::Pool(e.to_string()))?;

        // The pool connects lazily; check one connection out so bad
        // credentials or an unreachable host fail the start.
        {
            let mut conn = pool.get().await?;
            conn.simple_query("SELECT 1").await?.into_results().await?;
        }

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            pool_size = config.pool_size,
            "SQL Server pool ready"
        );

        Ok(Arc::new(MssqlBackend {
            pool: ArcSwapOption::from_pointee(pool),
        }))
    }
}

/// Live SQL Server pool.
pub struct MssqlBackend {
    pool: ArcSwapOption<DbPool>,
}

#[async_trait]
impl Backend for MssqlBackend {
    async fn fetch_cells(&self) -> Result<Vec<Cell>, DbError> {
        let pool = self.pool.load_full().ok_or(DbError::Closed)?;
        let mut conn = pool.get().await?;

        let rows = conn
            .simple_query(ACTIVE_CELLS_QUERY)
            .await?
            .into_first_result()
            .await?;

        rows.iter().map(row_to_cell).collect()
    }

    async fn close(&self) -> Result<(), DbError> {
        let pool = self.pool.swap(None).ok_or(DbError::Closed)?;
        let state = pool.state();
        tracing::debug!(
            connections = state.connections,
            idle = state.idle_connections,
            "Releasing SQL Server pool"
        );
        // Idle connections go with the last pool handle; checked-out ones
        // are dropped when their request finishes.
        drop(pool);
        Ok(())
    }
}

fn row_to_cell(row: &Row) -> Result<Cell, DbError> {
    Ok(Cell {
        number: int_column(row, "number")?,
        status: int_column(row, "status")?,
    })
}

/// Read an integer column of any SQL integer width.
fn int_column(row: &Row, name: &str) -> Result<i64, DbError> {
    let data = row
        .cells()
        .find(|(column, _)| column.name() == name)
        .map(|(_, data)| data)
        .ok_or_else(|| DbError::Row(format!("missing column `{name}`")))?;

    match data {
        ColumnData::U8(Some(v)) => Ok(i64::from(*v)),
        ColumnData::I16(Some(v)) => Ok(i64::from(*v)),
        ColumnData::I32(Some(v)) => Ok(i64::from(*v)),
        ColumnData::I64(Some(v)) => Ok(*v),
        ColumnData::U8(None)
        | ColumnData::I16(None)
        | ColumnData::I32(None)
        | ColumnData::I64(None) => Err(DbError::Row(format!("column `{name}` is NULL"))),
        other => Err(DbError::Row(format!(
            "column `{name}` is not an integer: {other:?}"
        ))),
    }
}
