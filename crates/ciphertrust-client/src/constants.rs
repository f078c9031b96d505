// REST API path constants, relative to `<address>/api`

pub mod api_path {
    // Auth
    pub const AUTH_TOKENS: &str = "/v1/auth/tokens";

    // Certificate authorities
    pub const LOCAL_CAS: &str = "/v1/ca/local-cas";

    // User management
    pub const USERS: &str = "/v1/usermgmt/users";
    pub const GROUPS: &str = "/v1/usermgmt/groups";
    pub const PASSWORD_POLICIES: &str = "/v1/usermgmt/pwdpolicies";

    // Keys
    pub const KEYS: &str = "/v1/vault/keys2";

    // Cluster
    pub const CLUSTER_NEW: &str = "/v1/cluster/new";
    pub const CLUSTER_CSR: &str = "/v1/cluster/csr";
    pub const CLUSTER_JOIN: &str = "/v1/cluster/join";
    pub const CLUSTER_NODES: &str = "/v1/nodes";

    // Domains
    pub const DOMAINS: &str = "/v1/domains";

    // Configs
    pub const INTERFACES: &str = "/v1/configs/interfaces";
    pub const SYSLOGS: &str = "/v1/configs/syslogs";
    pub const LOG_FORWARDERS: &str = "/v1/configs/log-forwarders";
    pub const PROXY: &str = "/v1/configs/proxy";
    pub const NTP_SERVERS: &str = "/v1/configs/ntp/servers";
    pub const PROPERTIES: &str = "/v1/configs/properties";

    // Licensing
    pub const LICENSES: &str = "/v1/licensing/licenses";
    pub const TRIALS: &str = "/v1/licensing/trials";

    // Scheduler
    pub const JOB_CONFIGS: &str = "/v1/scheduler/job-configs";

    // Client management
    pub const REG_TOKENS: &str = "/v1/client-management/regtokens";

    // System
    pub const SYSTEM_INFO: &str = "/v1/system/info";
}

/// Seconds before JWT expiry at which the token is refreshed
pub const TOKEN_REFRESH_MARGIN_SECS: u64 = 30;

/// JWT lifetime assumed when the appliance omits `duration`
pub const DEFAULT_TOKEN_DURATION_SECS: u64 = 300;

/// Page size used by listing calls
pub const DEFAULT_PAGE_LIMIT: i64 = 1000;
