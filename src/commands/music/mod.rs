pub(crate) mod clear;
pub(crate) mod join;
pub(crate) mod leave;
pub(crate) mod play;
pub(crate) mod queue;
pub(crate) mod skip;
pub(crate) mod stop;

pub mod audio_sources;
pub mod utils;

use crate::{CommandResult, Context};
use utils::music_manager::MusicError;

/// Guild of the invocation, or `NotInGuild` for DMs
fn guild_id(ctx: &Context<'_>) -> Result<serenity::model::id::GuildId, MusicError> {
    ctx.guild_id().ok_or(MusicError::NotInGuild)
}

pub use clear::clear;
pub use join::join;
pub use leave::leave;
pub use play::play;
pub use queue::queue;
pub use skip::skip;
pub use stop::stop;
