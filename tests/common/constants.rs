//! Shared constants for end-to-end tests
#![allow(dead_code)]

/// Client credentials the mock accepts
pub const TEST_CLIENT_ID: &str = "test-client";
pub const TEST_CLIENT_SECRET: &str = "test-secret";

/// Token handed out by the mock accounts endpoint
pub const TEST_ACCESS_TOKEN: &str = "mock-access-token";

// ============================================================================
// Mock catalog
// ============================================================================

pub const MASSIVE_ATTACK: &str = "Massive Attack";
pub const MASSIVE_ATTACK_ID: &str = "artist-massive-attack";

pub const PORTISHEAD: &str = "Portishead";
pub const PORTISHEAD_ID: &str = "artist-portishead";

pub const BURIAL: &str = "Burial";
pub const BURIAL_ID: &str = "artist-burial";

/// Artist the mock search never finds
pub const NOBODY: &str = "Nobody Knows This Band";
