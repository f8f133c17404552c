//! Risk Score Bands
//! Maps the 0-100 wallet risk score from the scoring service onto display bands
//!
//! - 0-20: Low
//! - 21-40: Moderate
//! - 41-60: Elevated
//! - 61-80: High
//! - 81-100: Critical

/// Display band of a wallet risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskBand {
    Low,
    Moderate,
    Elevated,
    High,
    Critical,
}

impl RiskBand {
    /// Band for a score; values above 100 count as 100
    pub fn from_score(score: u8) -> Self {
        match score.min(100) {
            0..=20 => RiskBand::Low,
            21..=40 => RiskBand::Moderate,
            41..=60 => RiskBand::Elevated,
            61..=80 => RiskBand::High,
            _ => RiskBand::Critical,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "✅ LOW RISK",
            RiskBand::Moderate => "🟡 MODERATE RISK",
            RiskBand::Elevated => "🟠 ELEVATED RISK",
            RiskBand::High => "🔴 HIGH RISK",
            RiskBand::Critical => "💀 CRITICAL RISK",
        }
    }

    /// Get color code for UI
    pub fn color_code(&self) -> &'static str {
        match self {
            RiskBand::Low => "#22c55e",      // Green
            RiskBand::Moderate => "#eab308", // Yellow
            RiskBand::Elevated => "#f97316", // Orange
            RiskBand::High => "#ef4444",     // Red
            RiskBand::Critical => "#7c2d12", // Dark red
        }
    }

    /// Suggested operator action
    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskBand::Low => "No action needed.",
            RiskBand::Moderate => "Keep under observation.",
            RiskBand::Elevated => "Manual review recommended.",
            RiskBand::High => "Consider freezing pending investigation.",
            RiskBand::Critical => "Freeze and escalate to law enforcement.",
        }
    }

    /// Bands where a freeze is the expected next step
    pub fn warrants_freeze(&self) -> bool {
        *self >= RiskBand::High
    }
}
