// file: src/cache/policy.rs
// description: access policy and actor model for cached references
// reference: user vs agent permission separation

use serde::{Deserialize, Serialize};

/// Permission level granted to an actor class on a cached reference.
///
/// `Execute` is the private-computation level: a value may be used
/// server-side without ever being readable by the holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    None,
    Execute,
    Read,
    Write,
    Full,
}

impl Permission {
    pub fn allows_read(&self) -> bool {
        matches!(self, Permission::Read | Permission::Write | Permission::Full)
    }

    pub fn allows_write(&self) -> bool {
        matches!(self, Permission::Write | Permission::Full)
    }

    pub fn allows_execute(&self) -> bool {
        !matches!(self, Permission::None)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Permission::None => "NONE (no access)",
            Permission::Execute => "EXECUTE only (can use in computation, cannot read)",
            Permission::Read => "READ (can read, cannot modify)",
            Permission::Write => "WRITE (can read and modify)",
            Permission::Full => "FULL (can read, write, execute)",
        }
    }
}

/// Caller identity class used for policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    User,
    Agent,
    /// Internal actor used for private computation. Bypasses policy.
    System,
}

/// Per-reference access policy split by actor class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub user_permissions: Permission,
    pub agent_permissions: Permission,
}

impl AccessPolicy {
    /// Users see everything, agents may read. Suits shared demo data.
    pub fn open() -> Self {
        Self {
            user_permissions: Permission::Full,
            agent_permissions: Permission::Read,
        }
    }

    /// Users see everything, agents may only use the value in
    /// server-side computation.
    pub fn secret() -> Self {
        Self {
            user_permissions: Permission::Full,
            agent_permissions: Permission::Execute,
        }
    }

    pub fn permissions_for(&self, actor: Actor) -> Permission {
        match actor {
            Actor::User => self.user_permissions,
            Actor::Agent => self.agent_permissions,
            Actor::System => Permission::Full,
        }
    }

    pub fn can_read(&self, actor: Actor) -> bool {
        self.permissions_for(actor).allows_read()
    }

    pub fn can_execute(&self, actor: Actor) -> bool {
        self.permissions_for(actor).allows_execute()
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_lattice() {
        assert!(Permission::Full.allows_read());
        assert!(Permission::Full.allows_write());
        assert!(Permission::Full.allows_execute());

        assert!(Permission::Read.allows_read());
        assert!(!Permission::Read.allows_write());

        assert!(!Permission::Execute.allows_read());
        assert!(Permission::Execute.allows_execute());

        assert!(!Permission::None.allows_execute());
    }

    #[test]
    fn test_secret_policy_blocks_agent_reads() {
        let policy = AccessPolicy::secret();

        assert!(policy.can_read(Actor::User));
        assert!(!policy.can_read(Actor::Agent));
        assert!(policy.can_execute(Actor::Agent));
    }

    #[test]
    fn test_system_actor_bypasses_policy() {
        let policy = AccessPolicy {
            user_permissions: Permission::None,
            agent_permissions: Permission::None,
        };

        assert!(policy.can_read(Actor::System));
        assert!(policy.can_execute(Actor::System));
    }

    #[test]
    fn test_open_policy_defaults() {
        let policy = AccessPolicy::default();
        assert_eq!(policy.user_permissions, Permission::Full);
        assert_eq!(policy.agent_permissions, Permission::Read);
    }
}
