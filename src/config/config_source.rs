// ==========================================
// 外贸统计导入管道 - 配置来源 Trait
// ==========================================
// 职责: 定义按键读取配置值的接口（不包含解析逻辑）
// 实现者: EnvConfigSource（进程环境变量）、MapConfigSource（测试/内存）
// ==========================================

use std::collections::HashMap;

// ==========================================
// ConfigSource Trait
// ==========================================
pub trait ConfigSource {
    /// 读取原始字符串值；未设置或为空白返回 None
    fn get(&self, key: &str) -> Option<String>;
}

/// 从进程环境变量读取（.env 需由调用方预先通过 dotenvy 加载）
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// 内存键值来源
#[derive(Debug, Default, Clone)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
