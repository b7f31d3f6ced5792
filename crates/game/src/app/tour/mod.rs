mod actor;
mod benefits;
mod bridge;
mod build_steps;
mod conclusion;
mod content;
mod examples;
mod progress;
mod session;
mod stage;
mod stations;
mod title;

#[cfg(test)]
mod tests;

pub(crate) use content::TOUR_TITLE;
pub(crate) use session::SessionState;
pub(crate) use stage::Stage;

use crate::app::settings::TourSettings;

use actor::ActorPhysics;
use benefits::BenefitsStage;
use bridge::BridgeStage;
use build_steps::BuildStepsStage;
use conclusion::ConclusionStage;
use examples::ExamplesStage;
use title::TitleStage;

/// The tour in presentation order.
pub(crate) fn build_stages(settings: &TourSettings) -> Vec<Stage> {
    let physics = ActorPhysics::from_settings(settings);
    vec![
        Stage::Title(TitleStage::new(physics)),
        Stage::Benefits(BenefitsStage::new(physics)),
        Stage::Bridge(BridgeStage::new(
            physics,
            settings.progress_step,
            settings.progress_max,
        )),
        Stage::BuildSteps(BuildStepsStage::new(physics)),
        Stage::Examples(ExamplesStage::new(physics)),
        Stage::Conclusion(ConclusionStage::new(physics)),
    ]
}
