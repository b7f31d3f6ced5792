use tour_engine::{
    EntityId, RenderableDesc, RenderableKind, SceneCommand, SceneWorld, Transform, Vec2,
};
use tracing::info;

use super::actor::{ActorPhysics, GROUND_TOP};
use super::session::{SessionState, StationKey};
use super::stage::{StageFrame, StageHud, CORNER_BUTTON_POSITION};
use super::stations::{station_def, station_overlay};

const STAGE_NAME: &str = "examples";
const STATION_HALF_EXTENTS: Vec2 = Vec2::new(28.0, 36.0);
const STATION_COLOR: [u8; 4] = [164, 92, 200, 255];
const STATION_VISITED_COLOR: [u8; 4] = [92, 64, 110, 255];

pub(crate) fn station_debug_name(key: StationKey) -> &'static str {
    match key {
        StationKey::Sha256 => "station.sha256",
        StationKey::HexEncode => "station.hex_encode",
        StationKey::RandomId => "station.random_id",
        StationKey::Checksum => "station.checksum",
    }
}

/// Four stations, each showing a code sample and its output once.
#[derive(Debug, Clone)]
pub(crate) struct ExamplesStage {
    pub(crate) frame: StageFrame,
    stations: Vec<(StationKey, EntityId)>,
}

impl ExamplesStage {
    pub(crate) fn new(physics: ActorPhysics) -> Self {
        Self {
            frame: StageFrame::new(
                physics,
                "Finish",
                CORNER_BUTTON_POSITION,
                SceneCommand::Advance,
            ),
            stations: Vec::new(),
        }
    }

    pub(crate) fn enter(&mut self, world: &mut SceneWorld, session: &SessionState) {
        self.frame.enter(world);
        self.stations = StationKey::ALL
            .iter()
            .enumerate()
            .map(|(index, key)| {
                let color = station_color(session.is_station_visited(*key));
                let station = world.spawn(
                    Transform {
                        position: Vec2::new(
                            240.0 + index as f32 * 180.0,
                            GROUND_TOP + STATION_HALF_EXTENTS.y,
                        ),
                    },
                    STATION_HALF_EXTENTS,
                    RenderableDesc {
                        kind: RenderableKind::Solid(color),
                        debug_name: station_debug_name(*key),
                    },
                );
                world.set_label(station, station_def(*key).title);
                (*key, station)
            })
            .collect();
    }

    pub(crate) fn handle_trigger(&mut self, world: &mut SceneWorld, session: &mut SessionState) {
        let touched = self.stations.iter().copied().find(|(key, station)| {
            !session.is_station_visited(*key) && self.frame.actor_touches(world, *station)
        });
        let Some((key, station)) = touched else {
            return;
        };
        if !session.visit_station(key) {
            return;
        }
        world.set_renderable_kind(station, RenderableKind::Solid(station_color(true)));
        info!(
            stage = STAGE_NAME,
            key = key.as_str(),
            visited = session.stations_visited_count(),
            "station_visited"
        );
        self.frame.present(STAGE_NAME, world, station_overlay(key));
    }

    pub(crate) fn check_completion(&self, session: &SessionState) -> bool {
        session.all_stations_visited()
    }

    pub(crate) fn exit(&mut self) {
        self.frame.exit();
        self.stations.clear();
    }

    pub(crate) fn hud(session: &SessionState) -> StageHud {
        StageHud {
            instructions: "Visit every station to run its example.",
            progress: Some(format!(
                "Stations {}/{}",
                session.stations_visited_count(),
                StationKey::ALL.len()
            )),
        }
    }
}

fn station_color(visited: bool) -> [u8; 4] {
    if visited {
        STATION_VISITED_COLOR
    } else {
        STATION_COLOR
    }
}
