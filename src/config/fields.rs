//! Field declarations for the host's configuration schema

/// Value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string
    String,
    /// Boolean flag
    Bool,
}

/// One externally visible configuration field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// External name, identical to the serialized key
    pub name: &'static str,
    /// Value type
    pub kind: FieldKind,
    /// Short description
    pub description: &'static str,
}

/// All fields accepted by a write and returned by a read
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        name: "url",
        kind: FieldKind::String,
        description: "Directory server URL, ldap:// or ldaps:// (default ldap://127.0.0.1)",
    },
    FieldDescriptor {
        name: "userdn",
        kind: FieldKind::String,
        description: "Base DN under which users are found",
    },
    FieldDescriptor {
        name: "groupdn",
        kind: FieldKind::String,
        description: "Base DN under which groups are found",
    },
    FieldDescriptor {
        name: "upndomain",
        kind: FieldKind::String,
        description: "Domain appended to user names for userPrincipalName logins",
    },
    FieldDescriptor {
        name: "userattr",
        kind: FieldKind::String,
        description: "Attribute holding the user name (default cn)",
    },
    FieldDescriptor {
        name: "certificate",
        kind: FieldKind::String,
        description: "PEM encoded CA certificate(s) trusted for the server certificate",
    },
    FieldDescriptor {
        name: "insecure_tls",
        kind: FieldKind::Bool,
        description: "Accept any server certificate and hostname; development only",
    },
    FieldDescriptor {
        name: "starttls",
        kind: FieldKind::Bool,
        description: "Upgrade ldap:// connections with StartTLS before use",
    },
];
