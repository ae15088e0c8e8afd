use shadow_rs::ShadowBuilder;

fn main() {
    // Build metadata backs `certcache --version`
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
