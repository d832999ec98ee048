// ── Typed request structs for Command payloads ──
//
// Each request validates itself before it is sent, so malformed input is
// rejected locally with a readable message instead of a backend error.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use sdnboard_api::backend::models::FlowRuleBody;

use crate::error::CoreError;

fn invalid(message: impl Into<String>) -> CoreError {
    CoreError::ValidationFailed {
        message: message.into(),
    }
}

/// Host names as the emulation agent accepts them.
pub fn validate_host_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() {
        return Err(invalid("host name is empty"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(invalid(format!("invalid host name '{name}'")));
    }
    Ok(())
}

// ── Links ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    pub source: i64,
    pub dest: i64,
    pub bandwidth_mbps: u32,
}

impl LinkRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.source == self.dest {
            return Err(invalid("a link needs two different switches"));
        }
        if self.bandwidth_mbps == 0 {
            return Err(invalid("bandwidth must be greater than 0 Mbps"));
        }
        Ok(())
    }
}

// ── Servers ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartServerRequest {
    pub host_name: String,
    pub video_path: String,
    pub weight: u32,
}

impl StartServerRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_host_name(&self.host_name)?;
        validate_video_and_weight(&self.video_path, self.weight)
    }
}

/// Start the same video on several hosts; each host succeeds or fails on
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartServersRequest {
    pub hosts: Vec<String>,
    pub video_path: String,
    pub weight: u32,
}

impl StartServersRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.hosts.is_empty() {
            return Err(invalid("no hosts given"));
        }
        for host in &self.hosts {
            validate_host_name(host)?;
        }
        validate_video_and_weight(&self.video_path, self.weight)
    }

    pub(crate) fn for_host(&self, host: &str) -> StartServerRequest {
        StartServerRequest {
            host_name: host.to_owned(),
            video_path: self.video_path.clone(),
            weight: self.weight,
        }
    }
}

fn validate_video_and_weight(video_path: &str, weight: u32) -> Result<(), CoreError> {
    if video_path.trim().is_empty() {
        return Err(invalid("video path is empty"));
    }
    if weight < 1 {
        return Err(invalid("server weight must be at least 1"));
    }
    Ok(())
}

// ── Flow rules ─────────────────────────────────────────────────────

/// Match fields and actions of an OpenFlow rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRuleRequest {
    /// Left empty on create to take the backend's next free id.
    pub rule_id: Option<i64>,
    pub priority: i64,
    pub eth_type: i64,
    pub ip_proto: Option<i64>,
    pub ipv4_src: Option<String>,
    pub ipv4_dst: Option<String>,
    pub tcp_src: Option<i64>,
    pub tcp_dst: Option<i64>,
    pub in_port: Option<i64>,
    pub actions: serde_json::Value,
}

impl FlowRuleRequest {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0..=65_535).contains(&self.priority) {
            return Err(invalid("priority must be between 0 and 65535"));
        }
        if !(0..=0xffff).contains(&self.eth_type) {
            return Err(invalid("eth_type must fit in 16 bits"));
        }
        for (field, addr) in [("ipv4_src", &self.ipv4_src), ("ipv4_dst", &self.ipv4_dst)] {
            if let Some(addr) = addr {
                // CIDR suffixes are accepted by the controller.
                let ip = addr.split('/').next().unwrap_or(addr);
                if ip.parse::<Ipv4Addr>().is_err() {
                    return Err(invalid(format!("{field} is not an IPv4 address: {addr}")));
                }
            }
        }
        for (field, port) in [("tcp_src", self.tcp_src), ("tcp_dst", self.tcp_dst)] {
            if port.is_some_and(|p| !(0..=65_535).contains(&p)) {
                return Err(invalid(format!("{field} is not a valid port")));
            }
        }
        if !self.actions.is_array() {
            return Err(invalid("actions must be a JSON array"));
        }
        Ok(())
    }

    pub(crate) fn to_body(&self, rule_id: i64) -> FlowRuleBody {
        FlowRuleBody {
            rule_id,
            priority: self.priority,
            eth_type: self.eth_type,
            ip_proto: self.ip_proto,
            ipv4_src: self.ipv4_src.clone(),
            ipv4_dst: self.ipv4_dst.clone(),
            tcp_src: self.tcp_src,
            tcp_dst: self.tcp_dst,
            in_port: self.in_port,
            actions: self.actions.clone(),
        }
    }
}
