use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{Error, Result};

/// Job category. Stored as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum JobType {
    Technical,
    Product,
    Operations,
    Design,
}

impl JobType {
    pub const ALL: [JobType; 4] = [
        JobType::Technical,
        JobType::Product,
        JobType::Operations,
        JobType::Design,
    ];

    pub fn code(self) -> i16 {
        match self {
            JobType::Technical => 0,
            JobType::Product => 1,
            JobType::Operations => 2,
            JobType::Design => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobType::Technical => "技术类",
            JobType::Product => "产品类",
            JobType::Operations => "运营类",
            JobType::Design => "设计类",
        }
    }

    pub fn from_code(code: i16) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(Error::UnknownCode {
                mapping: "job type",
                code,
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum City {
    Beijing,
    Shanghai,
    Shenzhen,
}

impl City {
    pub const ALL: [City; 3] = [City::Beijing, City::Shanghai, City::Shenzhen];

    pub fn code(self) -> i16 {
        match self {
            City::Beijing => 0,
            City::Shanghai => 1,
            City::Shenzhen => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            City::Beijing => "北京",
            City::Shanghai => "上海",
            City::Shenzhen => "深圳",
        }
    }

    pub fn from_code(code: i16) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.code() == code)
            .ok_or(Error::UnknownCode {
                mapping: "city",
                code,
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Job {
    pub id: i64,
    pub job_type: i16,
    pub job_name: String,
    pub job_city: i16,
    pub job_responsibility: String,
    pub job_requirement: String,
    pub creator: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
}

/// Fields of a job posting before it has been stored.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub job_type: JobType,
    pub job_name: String,
    pub job_city: City,
    pub job_responsibility: String,
    pub job_requirement: String,
    pub creator: Option<String>,
}
