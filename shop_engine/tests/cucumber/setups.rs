use cucumber::given;

use crate::cucumber::{shop_world::ShopSystem, ShopWorld};

#[given("a freshly stocked shop")]
async fn fresh_shop(world: &mut ShopWorld) {
    let system = ShopSystem::new().await;
    world.system = Some(system);
}
