use tour_engine::OverlayContent;

use super::session::BenefitKey;

pub(crate) const TOUR_TITLE: &str = "Bindings Tour";
pub(crate) const TITLE_TAGLINE: &str =
    "A short walk through why native bindings are worth having.";
pub(crate) const CONCLUSION_SUMMARY: &str =
    "You collected every benefit, built the bridge, followed the build and tried each example.";

pub(crate) fn benefit_label(key: BenefitKey) -> &'static str {
    match key {
        BenefitKey::Performance => "Speed",
        BenefitKey::MemorySafety => "Safety",
        BenefitKey::Concurrency => "Threads",
        BenefitKey::Ecosystem => "Crates",
        BenefitKey::Portability => "Targets",
    }
}

pub(crate) fn benefit_overlay(key: BenefitKey) -> OverlayContent {
    let (title, body) = match key {
        BenefitKey::Performance => (
            "Performance",
            "Hot loops run as native code. Hashing, parsing and encoding finish in a fraction of the time an interpreter needs.",
        ),
        BenefitKey::MemorySafety => (
            "Memory safety",
            "The native side is checked by the compiler. No use-after-free and no buffer overruns leak across the boundary.",
        ),
        BenefitKey::Concurrency => (
            "Concurrency",
            "Work can fan out over real threads and hand back one result to the caller.",
        ),
        BenefitKey::Ecosystem => (
            "Ecosystem",
            "Mature libraries for crypto, compression and parsing are one dependency away.",
        ),
        BenefitKey::Portability => (
            "Portability",
            "One source tree builds for desktop, mobile and the browser.",
        ),
    };
    OverlayContent::new(title, body)
}

pub(crate) fn bridge_complete_overlay() -> OverlayContent {
    OverlayContent::new(
        "Bridge built",
        "Every plank is in place. A binding layer works the same way: small typed pieces that join the host and the native library.",
    )
}

pub(crate) const BUILD_STEP_COUNT: usize = 6;

const BUILD_STEPS: [(&str, &str, &str); BUILD_STEP_COUNT] = [
    (
        "1. Create the library",
        "Start a library crate that will hold the native code.",
        "cargo new --lib native",
    ),
    (
        "2. Pick a crate type",
        "Ask the compiler for a C-compatible dynamic library.",
        "[lib]\ncrate-type = [\"cdylib\"]",
    ),
    (
        "3. Export a function",
        "Mark the function for export with a stable symbol name and C calling convention.",
        "#[no_mangle]\npub extern \"C\" fn adler32(ptr: *const u8, len: usize) -> u32",
    ),
    (
        "4. Generate bindings",
        "Produce the host-side declarations from the exported signatures.",
        "cbindgen --lang c --output native.h",
    ),
    (
        "5. Build for release",
        "Compile with optimizations so the native path is actually fast.",
        "cargo build --release",
    ),
    (
        "6. Call it",
        "Load the library from the host and call the bound function.",
        "let sum = native::adler32(b\"bindings\");",
    ),
];

pub(crate) fn build_step_overlay(index: usize) -> Option<OverlayContent> {
    BUILD_STEPS
        .get(index)
        .map(|(title, body, code)| OverlayContent::new(*title, *body).with_code(*code))
}
