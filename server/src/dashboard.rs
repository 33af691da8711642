//! Client dashboard navigation

use serde::{Deserialize, Serialize};

use crate::session::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DashboardTab {
    Overview,
    Bookings,
    Quotes,
    Profile,
    // Admin only
    Analytics,
    Equipment,
    AllBookings,
    Settings,
}

const CLIENT_TABS: &[DashboardTab] = &[
    DashboardTab::Overview,
    DashboardTab::Bookings,
    DashboardTab::Quotes,
    DashboardTab::Profile,
];

const ADMIN_TABS: &[DashboardTab] = &[
    DashboardTab::Analytics,
    DashboardTab::Equipment,
    DashboardTab::AllBookings,
    DashboardTab::Settings,
];

impl DashboardTab {
    pub fn id(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "overview",
            DashboardTab::Bookings => "bookings",
            DashboardTab::Quotes => "quotes",
            DashboardTab::Profile => "profile",
            DashboardTab::Analytics => "analytics",
            DashboardTab::Equipment => "equipment",
            DashboardTab::AllBookings => "all-bookings",
            DashboardTab::Settings => "settings",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DashboardTab::Overview => "Overview",
            DashboardTab::Bookings => "My Bookings",
            DashboardTab::Quotes => "Quotes",
            DashboardTab::Profile => "Profile",
            DashboardTab::Analytics => "Analytics",
            DashboardTab::Equipment => "Equipment",
            DashboardTab::AllBookings => "All Bookings",
            DashboardTab::Settings => "Settings",
        }
    }

    pub fn requires_admin(&self) -> bool {
        ADMIN_TABS.contains(self)
    }

    /// Resolve a tab id; unknown ids land on the overview
    pub fn from_id(id: &str) -> DashboardTab {
        CLIENT_TABS
            .iter()
            .chain(ADMIN_TABS)
            .find(|tab| tab.id() == id)
            .copied()
            .unwrap_or(DashboardTab::Overview)
    }
}

/// Tabs shown in the sidebar for `role`
pub fn tabs_for(role: Role) -> Vec<DashboardTab> {
    match role {
        Role::Client => CLIENT_TABS.to_vec(),
        Role::Admin => CLIENT_TABS.iter().chain(ADMIN_TABS).copied().collect(),
    }
}
