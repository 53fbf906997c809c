//! 电影目录的数据类型

use serde::{Deserialize, Serialize};

/// 电影记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub genre: String,
    pub release_year: i32,
    pub rating: f64,
}

/// 待新增的电影，id 由存储分配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub genre: String,
    pub release_year: i32,
    pub rating: f64,
}

impl NewMovie {
    /// 绑定存储分配的id
    pub fn with_id(self, id: i64) -> Movie {
        Movie {
            id,
            title: self.title,
            genre: self.genre,
            release_year: self.release_year,
            rating: self.rating,
        }
    }
}
