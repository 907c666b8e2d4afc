use super::super::domain::{AdmissionStatus, StudentSignals};
use super::{ScoreBreakdown, ScoreComponent, ScoreFactor, MAX_SCORE};

pub(crate) fn score_signals(signals: &StudentSignals) -> (Vec<ScoreComponent>, ScoreBreakdown) {
    let mut components = Vec::with_capacity(4);

    let credentials_points = match signals.credential_count {
        0 => 0,
        1 => 170,
        2 => 225,
        _ => ScoreFactor::Credentials.cap(),
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::Credentials,
        points: credentials_points,
        notes: match signals.credential_count {
            0 => "no issued credentials".to_string(),
            1 => "1 issued credential".to_string(),
            count => format!("{count} issued credentials"),
        },
    });

    let admission_points = match signals.admission_status {
        AdmissionStatus::Verified => ScoreFactor::Admission.cap(),
        AdmissionStatus::PendingVerification => 50,
        AdmissionStatus::None => 0,
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::Admission,
        points: admission_points,
        notes: match signals.admission_status {
            AdmissionStatus::Verified => "admission verified by university".to_string(),
            AdmissionStatus::PendingVerification => "admission awaiting verification".to_string(),
            AdmissionStatus::None => "no admission request".to_string(),
        },
    });

    // Any issued credential counts as evidence of academic performance.
    let academic_points = if signals.has_any_credential {
        ScoreFactor::AcademicPerformance.cap()
    } else {
        0
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::AcademicPerformance,
        points: academic_points,
        notes: if signals.has_any_credential {
            "academic record on ledger".to_string()
        } else {
            "no academic record".to_string()
        },
    });

    let profile_points = if signals.profile_complete {
        ScoreFactor::ProfileCompleteness.cap()
    } else {
        0
    };
    components.push(ScoreComponent {
        factor: ScoreFactor::ProfileCompleteness,
        points: profile_points,
        notes: if signals.profile_complete {
            "email and identification on file".to_string()
        } else {
            "profile missing email or identification".to_string()
        },
    });

    // Bucket caps sum to 940, so the clamp below is reachable.
    let raw_total = credentials_points + admission_points + academic_points + profile_points;
    let breakdown = ScoreBreakdown {
        credentials_points,
        admission_points,
        academic_points,
        profile_points,
        total: raw_total.min(MAX_SCORE),
    };

    (components, breakdown)
}
