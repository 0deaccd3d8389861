//! Skip reasons and warnings, returned as data.
//!
//! The library never logs a warning itself; it hands these back in a
//! [`SolidReport`](crate::SolidReport) and the caller decides how to surface them.

use flatcut_topo::TopoError;
use thiserror::Error;

/// Why a whole solid produced no outline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The solid has no faces at all.
    #[error("solid has no faces")]
    NoFaces,

    /// No face pair is separated by a distance inside the thickness band.
    #[error("no face separation within [{band_min}, {band_max}]")]
    NoThicknessMatch {
        /// Lower edge of the band.
        band_min: f64,
        /// Upper edge of the band.
        band_max: f64,
    },

    /// Every boundary of the selected face was unusable.
    #[error("selected face has no usable boundary loops")]
    NoUsableLoops,

    /// The outer boundary collapsed after rounding or has zero area.
    #[error("outer boundary is degenerate ({points} distinct points after rounding)")]
    DegenerateOuter {
        /// Points left after normalization.
        points: usize,
    },
}

/// A recoverable problem noticed while processing a solid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    /// A hole collapsed after rounding and was left out.
    #[error("hole {index} dropped: {points} distinct points after rounding")]
    HoleDropped {
        /// Position in the outline's hole list before dropping.
        index: usize,
        /// Points left after normalization.
        points: usize,
    },

    /// A boundary of the selected face is not a closed edge chain.
    #[error("boundary {index} of the selected face skipped: {reason}")]
    BrokenLoop {
        /// Loop index within the face.
        index: usize,
        /// What was wrong with it.
        reason: LoopError,
    },

    /// A boundary contains non-straight edges; they were cut as chords.
    #[error("boundary {index} has {count} curved edge(s) ({kinds}); cut as straight chords")]
    CurvedEdge {
        /// Loop index within the face.
        index: usize,
        /// Number of non-straight edges.
        count: usize,
        /// Distinct curve kinds, comma separated.
        kinds: String,
    },

    /// The in-plane reference edge is too short to define a direction.
    #[error("reference edge is degenerate; outline left at its original in-plane angle")]
    DegenerateReferenceEdge,

    /// Two boundaries have the same extent; the first was taken as outer.
    #[error("boundaries {first} and {second} tie for outer; using {first}")]
    AmbiguousOuterLoop {
        /// Loop chosen as outer.
        first: usize,
        /// Loop it tied with.
        second: usize,
    },

    /// No face lies flat after alignment; all faces were ranked instead.
    #[error("no face is perpendicular to the thickness axis; ranked all faces")]
    FaceNormalFallback,

    /// The Z extent is far larger than the detected thickness.
    #[error(
        "Z extent {extent:.3} far exceeds separation {separation:.3}; rescan over all vertices {}",
        rescan_outcome(.replaced)
    )]
    SuspectFacePair {
        /// Z extent of all vertices.
        extent: f64,
        /// Separation found by the face-pair scan.
        separation: f64,
        /// Whether the rescan result was used.
        replaced: bool,
    },
}

/// Why a single boundary could not be walked.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoopError {
    /// The loop has no edges.
    #[error("loop has no edges")]
    Empty,

    /// A referenced edge or vertex is missing.
    #[error(transparent)]
    Topology(#[from] TopoError),

    /// Edge `index` does not end where the next edge starts.
    #[error("edge {index} does not meet edge {next}")]
    Gap {
        /// Edge whose end is open.
        index: usize,
        /// Edge expected to start there.
        next: usize,
    },
}

fn rescan_outcome(replaced: &bool) -> &'static str {
    if *replaced {
        "replaced the face-pair result"
    } else {
        "found nothing better"
    }
}
