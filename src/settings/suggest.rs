//! Keyword-based role suggestions for the software-role fields.

use crate::api::types::Role;

use super::{GuildSettings, SettingsField};

/// Software-role fields and the name fragments that identify them.
pub const ROLE_KEYWORDS: [(SettingsField, &[&str]); 5] = [
    (SettingsField::AeRole, &["ae", "after effects", "vfx"]),
    (SettingsField::AmRole, &["am", "alight motion"]),
    (SettingsField::CapcutRole, &["capcut", "mobile"]),
    (SettingsField::PrRole, &["pr", "premiere"]),
    (SettingsField::PsRole, &["ps", "photoshop"]),
];

/// First role whose lowercased name contains any keyword.
pub fn find_role<'a>(roles: &'a [Role], keywords: &[&str]) -> Option<&'a Role> {
    roles.iter().find(|role| {
        let name = role.name.to_lowercase();
        keywords.iter().any(|k| name.contains(k))
    })
}

/// Fill every software-role field that has a matching role. Returns how
/// many fields were set; fields without a match are left alone.
pub fn suggest_roles(roles: &[Role], form: &mut GuildSettings) -> usize {
    let mut found = 0;
    for (field, keywords) in ROLE_KEYWORDS {
        if let Some(role) = find_role(roles, keywords) {
            form.set(field, role.id.clone());
            found += 1;
        }
    }
    found
}

/// Notice shown after a suggestion pass.
pub fn suggestion_message(found: usize) -> String {
    if found > 0 {
        format!("Successfully mapped {found} roles based on server scanning!")
    } else {
        "No clear matches found. You can try using the AI Architect to create these roles for you first."
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: &str, name: &str) -> Role {
        Role {
            id: id.to_string(),
            name: name.to_string(),
            color: 0,
            managed: false,
        }
    }

    #[test]
    fn maps_each_software_field() {
        let roles = vec![
            role("1", "@everyone"),
            role("2", "After Effects Editors"),
            role("3", "Alight Motion"),
            role("4", "CapCut"),
            role("5", "Premiere Users"),
            role("6", "Photoshop"),
        ];
        let mut form = GuildSettings::default();
        assert_eq!(suggest_roles(&roles, &mut form), 5);
        assert_eq!(form.get(SettingsField::AeRole), "2");
        assert_eq!(form.get(SettingsField::AmRole), "3");
        assert_eq!(form.get(SettingsField::CapcutRole), "4");
        assert_eq!(form.get(SettingsField::PrRole), "5");
        assert_eq!(form.get(SettingsField::PsRole), "6");
    }

    #[test]
    fn first_matching_role_wins() {
        let roles = vec![role("10", "VFX Team"), role("11", "AE")];
        assert_eq!(find_role(&roles, &["ae", "vfx"]).map(|r| r.id.as_str()), Some("10"));
    }

    #[test]
    fn no_match_leaves_form_alone() {
        let roles = vec![role("1", "Moderator"), role("2", "Bots")];
        let mut form = GuildSettings::default();
        form.set(SettingsField::PsRole, "99");
        assert_eq!(suggest_roles(&roles, &mut form), 0);
        assert_eq!(form.get(SettingsField::PsRole), "99");
    }

    #[test]
    fn messages() {
        assert_eq!(
            suggestion_message(3),
            "Successfully mapped 3 roles based on server scanning!"
        );
        assert!(suggestion_message(0).starts_with("No clear matches found."));
    }
}
