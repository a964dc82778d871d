//! Two-level numeric command table.
//!
//! The table is built once and never changes for the process lifetime, so
//! indices shown to the operator stay stable between renders.

/// Every operation the console can perform from a menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Exit,
    Define,
    Review,
    Launch,
    Validate,
    DeployDashboard,
    AccessDashboard,
    ViewNodes,
    AdminPassword,
    AdminToken,
    Delete,
}

/// Node of the dispatch tree. Groups keep their own action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: Action,
    pub children: Vec<MenuEntry>,
}

impl MenuEntry {
    pub fn leaf(label: &str, action: Action) -> Self {
        Self {
            label: label.to_string(),
            action,
            children: Vec::new(),
        }
    }

    pub fn group(label: &str, action: Action, children: Vec<MenuEntry>) -> Self {
        Self {
            label: label.to_string(),
            action,
            children,
        }
    }
}

/// Result of resolving a line of operator input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Action(Action),
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTable {
    entries: Vec<MenuEntry>,
}

impl DispatchTable {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        Self { entries }
    }

    /// The console's fixed menu.
    pub fn standard() -> Self {
        Self::new(vec![
            MenuEntry::leaf("Exit", Action::Exit),
            MenuEntry::group(
                "Define a Kubernetes cluster",
                Action::Define,
                vec![MenuEntry::leaf(
                    "Review the cluster definition",
                    Action::Review,
                )],
            ),
            MenuEntry::group(
                "Launch the cluster on AWS",
                Action::Launch,
                vec![
                    MenuEntry::leaf("Validate the cluster", Action::Validate),
                    MenuEntry::leaf(
                        "Deploy the Kubernetes web-dashboard",
                        Action::DeployDashboard,
                    ),
                    MenuEntry::leaf(
                        "Access the Kubernetes web-dashboard",
                        Action::AccessDashboard,
                    ),
                ],
            ),
            MenuEntry::group(
                "View the cluster",
                Action::ViewNodes,
                vec![
                    MenuEntry::leaf("Get the admin password", Action::AdminPassword),
                    MenuEntry::leaf(
                        "Get the admin service account token",
                        Action::AdminToken,
                    ),
                ],
            ),
            MenuEntry::leaf("Delete the cluster", Action::Delete),
        ])
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Resolve raw input to an action.
    ///
    /// The first digit indexes the top level (zero-based). A second digit
    /// selects a child, one-based. Characters after the second are ignored.
    pub fn resolve(&self, input: &str) -> Selection {
        let mut chars = input.chars();
        let Some(first) = chars.next().and_then(|c| c.to_digit(10)) else {
            return Selection::Invalid;
        };
        let Some(entry) = self.entries.get(first as usize) else {
            return Selection::Invalid;
        };
        let Some(second) = chars.next() else {
            return Selection::Action(entry.action);
        };
        let Some(second) = second.to_digit(10) else {
            return Selection::Invalid;
        };
        // "0" as a second digit has no child: it would be index -1.
        let Some(child_index) = (second as usize).checked_sub(1) else {
            return Selection::Invalid;
        };
        match entry.children.get(child_index) {
            Some(child) => Selection::Action(child.action),
            None => Selection::Invalid,
        }
    }

    /// Display lines: `"{i}: {label}"`, children as `"\t{i}{j+1}: {label}"`.
    pub fn render(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, entry) in self.entries.iter().enumerate() {
            lines.push(format!("{i}: {}", entry.label));
            for (j, child) in entry.children.iter().enumerate() {
                lines.push(format!("\t{i}{}: {}", j + 1, child.label));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_digit_selects_top_level_action() {
        let table = DispatchTable::standard();
        for (i, entry) in table.entries().iter().enumerate() {
            assert_eq!(
                table.resolve(&i.to_string()),
                Selection::Action(entry.action)
            );
        }
    }

    #[test]
    fn two_digits_select_child_one_based() {
        let table = DispatchTable::standard();
        assert_eq!(table.resolve("11"), Selection::Action(Action::Review));
        assert_eq!(table.resolve("21"), Selection::Action(Action::Validate));
        assert_eq!(
            table.resolve("23"),
            Selection::Action(Action::AccessDashboard)
        );
        assert_eq!(table.resolve("32"), Selection::Action(Action::AdminToken));
    }

    #[test]
    fn every_child_resolves_to_its_own_action() {
        let table = DispatchTable::standard();
        for (i, entry) in table.entries().iter().enumerate() {
            for (j, child) in entry.children.iter().enumerate() {
                let input = format!("{i}{}", j + 1);
                assert_eq!(table.resolve(&input), Selection::Action(child.action));
            }
        }
    }

    #[test]
    fn malformed_input_is_invalid() {
        let table = DispatchTable::standard();
        for input in ["", "a", "9", "5", " 1", "1a", "10", "12", "24", "01", "41"] {
            assert_eq!(table.resolve(input), Selection::Invalid, "input {input:?}");
        }
    }

    #[test]
    fn characters_after_the_second_are_ignored() {
        let table = DispatchTable::standard();
        assert_eq!(table.resolve("219"), Selection::Action(Action::Validate));
        assert_eq!(table.resolve("11xyz"), Selection::Action(Action::Review));
    }

    #[test]
    fn render_lists_groups_then_indented_children() {
        let lines = DispatchTable::standard().render();
        assert_eq!(
            lines,
            vec![
                "0: Exit",
                "1: Define a Kubernetes cluster",
                "\t11: Review the cluster definition",
                "2: Launch the cluster on AWS",
                "\t21: Validate the cluster",
                "\t22: Deploy the Kubernetes web-dashboard",
                "\t23: Access the Kubernetes web-dashboard",
                "3: View the cluster",
                "\t31: Get the admin password",
                "\t32: Get the admin service account token",
                "4: Delete the cluster",
            ]
        );
    }
}
