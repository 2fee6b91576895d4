//! Workspace membership
//!
//! A workspace keeps three mutually exclusive membership lists: the
//! bounded master list, the unbounded slave list and the floating list
//! (front = top of the floating z-order). A mapped toplevel is in exactly
//! one of them; a grabbed toplevel is temporarily in none.

use crate::wm::{OutputId, ToplevelId};

/// Which membership list a toplevel occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Master,
    Slave,
    Floating,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    /// Ordered master list, bounded by the configured master count.
    pub masters: Vec<ToplevelId>,

    /// Ordered slave list.
    pub slaves: Vec<ToplevelId>,

    /// Floating toplevels, front-most first.
    pub floating: Vec<ToplevelId>,

    /// The workspace's exclusive fullscreen toplevel, if any.
    pub fullscreen: Option<ToplevelId>,

    /// Owning output.
    pub output: OutputId,
}

impl Workspace {
    pub fn new(output: OutputId) -> Self {
        Self {
            masters: Vec::new(),
            slaves: Vec::new(),
            floating: Vec::new(),
            fullscreen: None,
            output,
        }
    }

    /// The list the toplevel currently occupies, if any.
    pub fn role_of(&self, toplevel: ToplevelId) -> Option<Role> {
        if self.masters.contains(&toplevel) {
            Some(Role::Master)
        } else if self.slaves.contains(&toplevel) {
            Some(Role::Slave)
        } else if self.floating.contains(&toplevel) {
            Some(Role::Floating)
        } else {
            None
        }
    }

    /// Remove the toplevel from whichever list holds it.
    pub fn remove(&mut self, toplevel: ToplevelId) -> Option<Role> {
        let role = self.role_of(toplevel)?;
        let list = match role {
            Role::Master => &mut self.masters,
            Role::Slave => &mut self.slaves,
            Role::Floating => &mut self.floating,
        };
        list.retain(|id| *id != toplevel);
        Some(role)
    }

    /// All tiled members, masters first.
    pub fn tiled(&self) -> impl Iterator<Item = ToplevelId> + '_ {
        self.masters.iter().chain(self.slaves.iter()).copied()
    }

    /// All members, in master, slave, floating order.
    pub fn members(&self) -> impl Iterator<Item = ToplevelId> + '_ {
        self.tiled().chain(self.floating.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::ToplevelId;

    fn id(n: u64) -> ToplevelId {
        ToplevelId(n)
    }

    #[test]
    fn test_role_and_remove() {
        let mut ws = Workspace::new(OutputId(0));
        ws.masters.push(id(1));
        ws.slaves.push(id(2));
        ws.floating.push(id(3));

        assert_eq!(ws.role_of(id(1)), Some(Role::Master));
        assert_eq!(ws.role_of(id(2)), Some(Role::Slave));
        assert_eq!(ws.role_of(id(3)), Some(Role::Floating));
        assert_eq!(ws.role_of(id(4)), None);

        assert_eq!(ws.remove(id(2)), Some(Role::Slave));
        assert!(ws.slaves.is_empty());
        assert_eq!(ws.remove(id(2)), None);
    }

    #[test]
    fn test_members_order() {
        let mut ws = Workspace::new(OutputId(0));
        ws.masters.push(id(1));
        ws.slaves.push(id(2));
        ws.floating.push(id(3));
        let members: Vec<_> = ws.members().collect();
        assert_eq!(members, vec![id(1), id(2), id(3)]);
    }
}
