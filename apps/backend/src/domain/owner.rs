/// Who a favorite belongs to. Exactly one identity per row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerKey {
    User(i64),
    Device(String),
}

impl OwnerKey {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            OwnerKey::User(id) => Some(*id),
            OwnerKey::Device(_) => None,
        }
    }
}

/// Dedup key for view counting. Signed-in users win over devices, devices over IPs.
pub fn viewer_key(user_id: Option<i64>, device_token: Option<&str>, peer: Option<&str>) -> Option<String> {
    if let Some(id) = user_id {
        return Some(format!("u:{id}"));
    }
    if let Some(token) = device_token {
        return Some(format!("d:{token}"));
    }
    peer.filter(|p| !p.is_empty()).map(|p| format!("ip:{p}"))
}
