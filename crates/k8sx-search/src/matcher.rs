//! Query classification and resource matching

use std::net::IpAddr;

use k8sx_types::{PodInfo, ServiceInfo, ServiceType};

use crate::error::SearchError;

/// True if `query` is an IPv4 or IPv6 literal
pub fn is_ip_query(query: &str) -> bool {
    query.parse::<IpAddr>().is_ok()
}

/// What a search looks for
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    /// Exact IP match against pod, host, cluster, external and LB ingress IPs
    Ip(String),
    /// Case-sensitive substring of the pod name
    Name(String),
}

impl Query {
    /// Pick the search mode from the query itself
    pub fn parse(raw: &str) -> Result<Self, SearchError> {
        if is_ip_query(raw) {
            Ok(Self::Ip(raw.to_string()))
        } else {
            Self::name(raw)
        }
    }

    pub fn ip(raw: &str) -> Result<Self, SearchError> {
        if is_ip_query(raw) {
            Ok(Self::Ip(raw.to_string()))
        } else {
            Err(SearchError::InvalidIp(raw.to_string()))
        }
    }

    pub fn name(raw: &str) -> Result<Self, SearchError> {
        if raw.is_empty() {
            Err(SearchError::EmptyQuery)
        } else {
            Ok(Self::Name(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Ip(s) | Self::Name(s) => s,
        }
    }

    pub fn is_ip(&self) -> bool {
        matches!(self, Self::Ip(_))
    }
}

/// Matching rules shared by pod and service records
pub trait Matches {
    fn matches_ip(&self, ip: &str) -> bool;

    fn name(&self) -> &str;

    fn matches_name(&self, substring: &str) -> bool {
        self.name().contains(substring)
    }
}

impl Matches for PodInfo {
    fn matches_ip(&self, ip: &str) -> bool {
        self.pod_ip == ip || self.host_ip == ip
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Matches for ServiceInfo {
    fn matches_ip(&self, ip: &str) -> bool {
        if self.cluster_ip == ip || self.external_ips.iter().any(|e| e == ip) {
            return true;
        }

        // Ingress IPs only count for LoadBalancer services
        self.service_type == ServiceType::LoadBalancer
            && self.load_balancer_ips.iter().any(|lb| lb == ip)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
