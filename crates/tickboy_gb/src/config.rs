use typed_builder::TypedBuilder;

/// Construction-time options for [`GameBoy`](crate::GameBoy).
///
/// ```
/// use tickboy_gb::EmulatorConfig;
///
/// let config = EmulatorConfig::builder()
///     .frame_limit(false)
///     .breakpoints(vec![0x0150])
///     .build();
/// assert!(!config.frame_limit);
/// ```
#[derive(TypedBuilder, Clone, Debug)]
pub struct EmulatorConfig {
    /// Pace `run_frame` to real DMG speed (~59.73 Hz).
    #[builder(default = true)]
    pub frame_limit: bool,
    /// Initial custom memory window for snapshots, `[start, end)`.
    #[builder(default)]
    pub snapshot_range: Option<(u16, u16)>,
    /// Addresses registered (enabled) as breakpoints at startup.
    #[builder(default)]
    pub breakpoints: Vec<u16>,
    /// Fill WRAM/HRAM with a fixed pseudo-random pattern on reset instead of
    /// zeroes.
    #[builder(default = true)]
    pub seed_ram: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
