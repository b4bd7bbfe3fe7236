//! Collision layer constants shared by every backend.
//!
//! - **Layer:** which group a body lives in
//! - **Mask:** which groups it collides with / a query accepts
//!
//! Bit 0 is reserved. The same bits feed Rapier `CollisionGroups` and the
//! headless arena's spatial queries.

/// Bit set used as a layer filter in spatial queries.
pub type LayerMask = u32;

// ============================================================================
// Layers
// ============================================================================

/// Vehicles (AI and player tanks)
pub const COLLISION_LAYER_VEHICLES: LayerMask = 0b10; // 2

/// Static environment (walls, rocks, buildings)
pub const COLLISION_LAYER_ENVIRONMENT: LayerMask = 0b100; // 4

// ============================================================================
// Masks
// ============================================================================

/// Vehicles collide with vehicles and the environment.
pub const COLLISION_MASK_VEHICLES: LayerMask = COLLISION_LAYER_VEHICLES | COLLISION_LAYER_ENVIRONMENT;

/// Static environment only stops vehicles.
pub const COLLISION_MASK_ENVIRONMENT: LayerMask = COLLISION_LAYER_VEHICLES;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_and_environment_masks_agree() {
        // Every pair that collides is accepted by both sides
        assert_ne!(COLLISION_MASK_VEHICLES & COLLISION_LAYER_ENVIRONMENT, 0);
        assert_ne!(COLLISION_MASK_ENVIRONMENT & COLLISION_LAYER_VEHICLES, 0);
        assert_eq!(COLLISION_MASK_ENVIRONMENT & COLLISION_LAYER_ENVIRONMENT, 0);
        assert_eq!(COLLISION_LAYER_VEHICLES & COLLISION_LAYER_ENVIRONMENT, 0);
    }
}
