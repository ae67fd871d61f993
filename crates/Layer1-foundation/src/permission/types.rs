//! 권한 기본 타입
//!
//! - `Role`: 사용자 역할 (닫힌 집합, 경계에서 검증)
//! - `PermissionKey`: 메뉴/기능 식별자
//! - `RoleRequirement`: 역할 제약 (집합, 단일 역할은 원소 하나짜리 집합)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Role
// ============================================================================

/// 사용자 역할
///
/// 세션 동안 불변. 외부 데이터에서 들어온 문자열은 `FromStr`/serde에서
/// 검증되며 모르는 역할은 에러가 된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Finance,
    Business,
    Operator,
    Partner,
    Viewer,
}

impl Role {
    /// 모든 역할 (선언 순서)
    pub const ALL: [Role; 6] = [
        Role::Admin,
        Role::Finance,
        Role::Business,
        Role::Operator,
        Role::Partner,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Finance => "finance",
            Role::Business => "business",
            Role::Operator => "operator",
            Role::Partner => "partner",
            Role::Viewer => "viewer",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| Error::UnknownRole(s.to_string()))
    }
}

// ============================================================================
// PermissionKey
// ============================================================================

/// 메뉴 항목 또는 기능 동작 식별자
///
/// 예: `menu.finance.reconciliation`, `fn.waybill.export`.
/// 역직렬화 시 검증된다 (빈 문자열, 공백 포함 불가).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionKey(String);

impl PermissionKey {
    /// 검증 없이 생성 (코드에 정의된 정적 키용)
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// 외부 입력 검증 후 생성
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(Error::InvalidPermissionKey(key));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PermissionKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PermissionKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<PermissionKey> for String {
    fn from(key: PermissionKey) -> Self {
        key.0
    }
}

impl From<&str> for PermissionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// 메뉴/기능 구분
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    Menu,
    Function,
}

// ============================================================================
// RoleRequirement
// ============================================================================

/// 역할 제약
///
/// 비어 있으면 제약 없음. 단일 역할은 원소 하나짜리 집합으로 취급.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRequirement {
    roles: BTreeSet<Role>,
}

impl RoleRequirement {
    /// 제약 없음
    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_unconstrained(&self) -> bool {
        self.roles.is_empty()
    }

    /// 세션 역할이 제약을 만족하는지
    ///
    /// 제약이 있을 때 역할이 없으면(세션 없음) 거부.
    pub fn allows(&self, role: Option<Role>) -> bool {
        if self.roles.is_empty() {
            return true;
        }
        role.map(|r| self.roles.contains(&r)).unwrap_or(false)
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }
}

impl From<Role> for RoleRequirement {
    fn from(role: Role) -> Self {
        Self {
            roles: BTreeSet::from([role]),
        }
    }
}

impl<const N: usize> From<[Role; N]> for RoleRequirement {
    fn from(roles: [Role; N]) -> Self {
        roles.into_iter().collect()
    }
}

impl FromIterator<Role> for RoleRequirement {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}
