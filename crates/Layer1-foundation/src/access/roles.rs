//! 기본 역할 정의

/// 최고 관리자
pub const SUPER_ADMIN: &str = "super-admin";
/// 관리자
pub const ADMIN: &str = "admin";
/// 일반 사용자
pub const USER: &str = "user";

/// 항상 존재해야 하는 역할 (순서 유지)
pub const BASELINE_ROLES: [&str; 3] = [SUPER_ADMIN, ADMIN, USER];

/// 기본 역할 여부
pub fn is_baseline(role: &str) -> bool {
    BASELINE_ROLES.contains(&role)
}

/// 표시용 이름 (기본 역할 외에는 id 그대로)
pub fn role_label(role: &str) -> &str {
    match role {
        SUPER_ADMIN => "Super administrator",
        ADMIN => "Administrator",
        USER => "User",
        other => other,
    }
}
