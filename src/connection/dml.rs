use super::Connection;
use crate::driver::{BindParams, BindValue, ExecOutcome, ExecuteOptions, LobKind};
use crate::error::LobMiddlewareError;
use crate::types::{DmlOptions, LobMetaInfo, LobPayload, LobWriteJob, RowValues, WriteResult};
use crate::writer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Insert,
    Update,
}

impl Connection {
    /// Execute a plain DML statement and return rows affected.
    ///
    /// # Errors
    /// Returns the driver error, or `Execution` when the statement
    /// produced a query outcome.
    pub async fn execute_dml(
        &mut self,
        sql: &str,
        params: BindParams,
        auto_commit: bool,
    ) -> Result<u64, LobMiddlewareError> {
        let outcome = self
            .raw_mut()
            .execute(sql, params, ExecuteOptions { auto_commit })
            .await?;
        match outcome {
            ExecOutcome::Write(write) => Ok(write.rows_affected),
            _ => Err(LobMiddlewareError::Execution(
                "DML statement produced a query outcome".into(),
            )),
        }
    }

    /// Insert one row, populating LOB columns through RETURNING-clause
    /// out-binds when `options.lob_meta_info` has entries.
    ///
    /// The statement must affect exactly one row.
    ///
    /// # Errors
    /// Driver, bind-wiring, row-count, and LOB-write errors; none of
    /// these commit.
    pub async fn insert(
        &mut self,
        sql: &str,
        params: BindParams,
        options: DmlOptions,
    ) -> Result<WriteResult, LobMiddlewareError> {
        self.write_with_lobs(sql, params, options, WriteMode::Insert)
            .await
    }

    /// Update rows, populating LOB columns through RETURNING-clause
    /// out-binds when `options.lob_meta_info` has entries. Every affected
    /// row receives the same LOB content.
    ///
    /// The statement must affect at least one row.
    ///
    /// # Errors
    /// Driver, bind-wiring, row-count, and LOB-write errors; none of
    /// these commit.
    pub async fn update(
        &mut self,
        sql: &str,
        params: BindParams,
        options: DmlOptions,
    ) -> Result<WriteResult, LobMiddlewareError> {
        self.write_with_lobs(sql, params, options, WriteMode::Update)
            .await
    }

    async fn write_with_lobs(
        &mut self,
        sql: &str,
        mut params: BindParams,
        options: DmlOptions,
        mode: WriteMode,
    ) -> Result<WriteResult, LobMiddlewareError> {
        if options.lob_meta_info.is_empty() {
            let rows_affected = self.execute_dml(sql, params, options.auto_commit).await?;
            return Ok(WriteResult { rows_affected });
        }

        let jobs = coerce_lob_binds(&mut params, &options.lob_meta_info)?;
        let rewritten = append_returning_clause(sql, &options.lob_meta_info);

        // Committing as part of the execute would freeze the LOBs empty
        // before they are written; run uncommitted and commit after the
        // writes when the caller asked for auto-commit.
        let outcome = self
            .raw_mut()
            .execute(&rewritten, params, ExecuteOptions { auto_commit: false })
            .await?;
        let ExecOutcome::Write(mut write) = outcome else {
            return Err(LobMiddlewareError::Execution(
                "insert/update produced a query outcome".into(),
            ));
        };

        match mode {
            WriteMode::Insert if write.rows_affected != 1 => {
                return Err(LobMiddlewareError::Execution(format!(
                    "insert affected {} rows, expected exactly 1",
                    write.rows_affected
                )));
            }
            WriteMode::Update if write.rows_affected == 0 => {
                return Err(LobMiddlewareError::Execution(
                    "update affected no rows".into(),
                ));
            }
            _ => {}
        }

        match mode {
            WriteMode::Insert => writer::write_record(&mut write.out_binds, &jobs).await?,
            WriteMode::Update => writer::write_records(&mut write.out_binds, &jobs).await?,
        }

        if options.auto_commit {
            self.commit().await?;
        }

        Ok(WriteResult {
            rows_affected: write.rows_affected,
        })
    }
}

/// Append the `RETURNING <cols> INTO <binds>` clause, columns and binds
/// comma-joined in the meta map's insertion order.
fn append_returning_clause(sql: &str, meta: &LobMetaInfo) -> String {
    let columns: Vec<&str> = meta.entries().map(|(column, _)| column).collect();
    let binds: Vec<String> = meta.entries().map(|(_, bind)| format!(":{bind}")).collect();
    format!(
        "{} RETURNING {} INTO {}",
        sql.trim_end(),
        columns.join(", "),
        binds.join(", ")
    )
}

/// Replace each meta-listed bind with an OUT LOB descriptor — CLOB for
/// text content, BLOB otherwise — and collect the write jobs for the
/// payloads taken out.
fn coerce_lob_binds(
    params: &mut BindParams,
    meta: &LobMetaInfo,
) -> Result<Vec<LobWriteJob>, LobMiddlewareError> {
    let Some(named) = params.named_mut() else {
        return Err(LobMiddlewareError::Parameter(
            "lob meta info requires named bind parameters".into(),
        ));
    };

    let mut jobs = Vec::with_capacity(meta.len());
    for (_, bind_name) in meta.entries() {
        let value = named.get_mut(bind_name).ok_or_else(|| {
            LobMiddlewareError::Parameter(format!(
                "no bind value for lob bind variable '{bind_name}'"
            ))
        })?;

        let taken = std::mem::replace(value, BindValue::OutLob(LobKind::Binary));
        let (kind, payload) = match taken {
            BindValue::In(RowValues::Text(text)) => {
                (LobKind::Character, Some(LobPayload::Text(text)))
            }
            BindValue::In(RowValues::Blob(bytes)) => {
                (LobKind::Binary, Some(LobPayload::Blob(bytes)))
            }
            BindValue::In(RowValues::Null) => (LobKind::Binary, None),
            BindValue::OutLob(kind) => (kind, None),
            BindValue::In(other) => {
                return Err(LobMiddlewareError::Parameter(format!(
                    "bind '{bind_name}' must carry text or binary lob content, found {other:?}"
                )));
            }
        };
        *value = BindValue::OutLob(kind);

        if let Some(payload) = payload {
            jobs.push(LobWriteJob {
                bind_name: bind_name.to_string(),
                payload,
            });
        }
    }
    Ok(jobs)
}
