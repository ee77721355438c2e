// ==========================================
// 外贸统计导入管道 - SQLite 规范表存储
// ==========================================
// 职责: 将规范表整表物化到嵌入式 SQLite 库
// 红线: 删除重建 + 全量插入在同一事务内完成；只做数据写入，不含业务规则
// ==========================================

use crate::db::{open_in_memory_connection, open_sqlite_connection};
use crate::domain::table::{FieldValue, TableSchema, TableView};
use crate::importer::error::{EtlError, EtlResult};
use crate::repository::table_writer::TableWriter;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::fs;
use std::path::Path;
use tracing::info;

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name), c.column_type.sql_type()))
        .collect();
    format!(
        "CREATE TABLE {} ({})",
        quote_ident(schema.name),
        columns.join(", ")
    )
}

fn insert_sql(schema: &TableSchema) -> String {
    let placeholders: Vec<String> = (1..=schema.columns.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT INTO {} VALUES ({})",
        quote_ident(schema.name),
        placeholders.join(", ")
    )
}

fn to_sql_value(value: FieldValue) -> Value {
    match value {
        FieldValue::Text(s) => Value::Text(s),
        FieldValue::Integer(i) => Value::Integer(i),
        FieldValue::Real(f) => Value::Real(f),
    }
}

// ==========================================
// SqliteTableStore
// ==========================================
pub struct SqliteTableStore {
    conn: Connection,
}

impl SqliteTableStore {
    /// 打开（或创建）库文件，必要时创建父目录
    pub fn open(db_path: &Path) -> EtlResult<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> EtlResult<Self> {
        Ok(Self {
            conn: open_in_memory_connection()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// 删除并重建同名表，在一个事务中插入全部行
    pub fn replace_table(&mut self, table: &dyn TableView) -> EtlResult<usize> {
        let schema = table.schema();
        let tx = self.conn.transaction()?;

        tx.execute_batch(&format!("DROP TABLE IF EXISTS {};", quote_ident(schema.name)))?;
        tx.execute_batch(&format!("{};", create_table_sql(schema)))?;

        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(&insert_sql(schema))?;
            for values in table.row_values() {
                let params: Vec<Value> = values.into_iter().map(to_sql_value).collect();
                inserted += stmt.execute(params_from_iter(params))?;
            }
        }
        tx.commit()?;

        info!(table = schema.name, rows = inserted, "SQLite 表替换完成");
        Ok(inserted)
    }

    /// 表行数
    pub fn row_count(&self, table_name: &str) -> EtlResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table_name));
        let count = self.conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?;
        Ok(count)
    }

    /// 表的列名与声明类型（按列顺序）
    pub fn table_columns(&self, table_name: &str) -> EtlResult<Vec<(String, String)>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table_name));
        let mut stmt = self.conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Err(EtlError::DatabaseError(format!("表不存在: {}", table_name)));
        }
        Ok(columns)
    }
}

impl TableWriter for SqliteTableStore {
    fn write_table(&mut self, table: &dyn TableView) -> EtlResult<()> {
        self.replace_table(table).map(|_| ())
    }
}
