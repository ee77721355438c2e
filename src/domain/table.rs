// ==========================================
// 外贸统计导入管道 - 规范表结构
// ==========================================
// 职责: 表结构（列定义）+ 类型化行 + 空表兜底
// 红线: 列集合固定，与源文件质量无关
// ==========================================

use serde::Serialize;
use std::fmt;

/// 列类型（落库时映射为 SQLite 类型）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
}

impl ColumnType {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Text,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Integer,
        }
    }

    pub const fn real(name: &'static str) -> Self {
        Self {
            name,
            column_type: ColumnType::Real,
        }
    }
}

/// 表结构：表名 + 有序列定义
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}

/// 单元格输出值（按列顺序）
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Real(f64),
}

impl FieldValue {
    /// 输出为 CSV 文本（浮点数使用最短往返表示，保证确定性）
    pub fn to_csv_string(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Real(f) => f.to_string(),
        }
    }
}

/// 规范表的行
pub trait TableRow {
    /// 按表结构列顺序返回字段值
    fn field_values(&self) -> Vec<FieldValue>;
}

/// 规范表（行有序，列集合由 schema 决定）
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    pub schema: &'static TableSchema,
    pub rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(schema: &'static TableSchema, rows: Vec<R>) -> Self {
        Self { schema, rows }
    }

    /// 空表兜底：列集合不变，零行
    pub fn empty(schema: &'static TableSchema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 对象安全的只读视图，供持久化层统一处理五张异构表
pub trait TableView {
    fn schema(&self) -> &'static TableSchema;
    fn row_count(&self) -> usize;
    fn row_values(&self) -> Box<dyn Iterator<Item = Vec<FieldValue>> + '_>;
}

impl<R: TableRow> TableView for Table<R> {
    fn schema(&self) -> &'static TableSchema {
        self.schema
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn row_values(&self) -> Box<dyn Iterator<Item = Vec<FieldValue>> + '_> {
        Box::new(self.rows.iter().map(TableRow::field_values))
    }
}
