use serde::{Deserialize, Serialize};

use crate::skeleton::Skeleton;

/// How a named sub-segment of a skeleton is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    /// `{name}_start` to `{name}_end`.
    Straight,
    /// A quadratic arc from `{name}_start` through the pull of `{name}_bend` to `{name}_end`.
    Arced,
    /// Arced when the skeleton has a `{name}_bend`, straight otherwise. Only
    /// `{name}_start` and `{name}_end` are required.
    Bendable,
}

/// One named piece of an archetype. An empty name means the bare joint names
/// `start`, `bend` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonSegment {
    pub name: &'static str,
    pub shape: SegmentShape,
}

impl SkeletonSegment {
    pub fn joint(&self, role: &str) -> String {
        if self.name.is_empty() {
            role.to_string()
        } else {
            format!("{}_{}", self.name, role)
        }
    }

    /// Joint names this segment needs, in drawing order.
    pub fn joint_names(&self) -> Vec<String> {
        match self.shape {
            SegmentShape::Straight | SegmentShape::Bendable => {
                vec![self.joint("start"), self.joint("end")]
            }
            SegmentShape::Arced => vec![
                self.joint("start"),
                self.joint("bend"),
                self.joint("end"),
            ],
        }
    }

    /// Prefix for the ids of the bones cut from this segment.
    pub fn bone_prefix(&self) -> String {
        self.joint("segment")
    }
}

/// Every stroke topology bones can be extracted for.
///
/// Strokes are named after their pinyin parts: heng (horizontal), shu
/// (vertical), pie (left falling), na (right falling), dian (dot), tiao (rising),
/// zhe (turn), wan (bend) and gou (hook).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Line,
    Curve,
    HengGou,
    HengPie,
    HengZheGou,
    HengZheWan,
    HengZheTiao,
    HengWanGou,
    HengZheWanGou,
    HengPieWanGou,
    HengZheZhePie,
    HengZheZheWanGou,
    ErHengZhe,
    ShuGou,
    ShuZhe,
    ShuPie,
    ShuWanGou,
    ShuZheZheGou,
    TiaoNa,
    PieTiao,
    PieDian,
    WanGou,
    XieGou,
    HengZhe,
    ShuWan,
    ShuTiao,
    Shu,
    Tiao,
    Na,
    Dian,
}

const fn straight(name: &'static str) -> SkeletonSegment {
    SkeletonSegment {
        name,
        shape: SegmentShape::Straight,
    }
}

const fn arced(name: &'static str) -> SkeletonSegment {
    SkeletonSegment {
        name,
        shape: SegmentShape::Arced,
    }
}

const fn bendable(name: &'static str) -> SkeletonSegment {
    SkeletonSegment {
        name,
        shape: SegmentShape::Bendable,
    }
}

const LINE: &[SkeletonSegment] = &[straight("")];
const CURVE: &[SkeletonSegment] = &[arced("")];
const HENG_GOU: &[SkeletonSegment] = &[straight("heng"), straight("gou")];
const HENG_PIE: &[SkeletonSegment] = &[straight("heng"), arced("pie")];
const HENG_ZHE_GOU: &[SkeletonSegment] = &[straight("heng"), straight("zhe"), straight("gou")];
const HENG_ZHE_WAN: &[SkeletonSegment] = &[straight("heng"), straight("zhe"), straight("wan")];
const HENG_ZHE_TIAO: &[SkeletonSegment] = &[straight("heng"), straight("zhe"), bendable("tiao")];
const HENG_WAN_GOU: &[SkeletonSegment] = &[straight("heng"), arced("wan"), straight("gou")];
const HENG_ZHE_WAN_GOU: &[SkeletonSegment] = &[
    straight("heng"),
    arced("zhe"),
    straight("wan"),
    straight("gou"),
];
const HENG_PIE_WAN_GOU: &[SkeletonSegment] = &[straight("heng"), bendable("pie"), arced("wangou")];
const HENG_ZHE_ZHE_PIE: &[SkeletonSegment] = &[
    straight("heng"),
    straight("zhe1"),
    straight("zhe2"),
    arced("pie"),
];
const HENG_ZHE_ZHE_WAN_GOU: &[SkeletonSegment] = &[
    straight("heng"),
    straight("zhe1"),
    straight("zhe2"),
    straight("wan"),
    straight("gou"),
];
const ER_HENG_ZHE: &[SkeletonSegment] = &[
    straight("heng1"),
    straight("zhe1"),
    straight("heng2"),
    straight("zhe2"),
];
const SHU_GOU: &[SkeletonSegment] = &[straight("shu"), straight("gou")];
const SHU_ZHE: &[SkeletonSegment] = &[straight("shu"), straight("zhe")];
const SHU_PIE: &[SkeletonSegment] = &[straight("shu"), arced("pie")];
const SHU_WAN_GOU: &[SkeletonSegment] = &[straight("shu"), straight("wan"), straight("gou")];
const SHU_ZHE_ZHE_GOU: &[SkeletonSegment] = &[
    straight("shu"),
    straight("zhe1"),
    straight("zhe2"),
    straight("gou"),
];
const TIAO_NA: &[SkeletonSegment] = &[straight("tiao"), arced("na")];
const PIE_TIAO: &[SkeletonSegment] = &[arced("pie"), arced("tiao")];
const PIE_DIAN: &[SkeletonSegment] = &[arced("pie"), arced("dian")];
const WAN_GOU: &[SkeletonSegment] = &[arced("wan"), straight("gou")];
const XIE_GOU: &[SkeletonSegment] = &[arced("xie"), straight("gou")];
const HENG_ZHE: &[SkeletonSegment] = &[straight("heng"), straight("zhe")];
const SHU_WAN: &[SkeletonSegment] = &[straight("shu"), bendable("wan")];
const SHU_TIAO: &[SkeletonSegment] = &[straight("shu"), arced("tiao")];
const SHU: &[SkeletonSegment] = &[straight("shu")];
const TIAO: &[SkeletonSegment] = &[arced("tiao")];
const NA: &[SkeletonSegment] = &[arced("na")];
const DIAN: &[SkeletonSegment] = &[arced("dian")];

// Checked first to last; the first archetype whose joints are all present wins.
// Archetypes with more joints come first so a stroke is never mistaken for one
// of its own parts.
const CLASSIFY_ORDER: [Archetype; 30] = [
    Archetype::HengZheZheWanGou,
    Archetype::HengZheZhePie,
    Archetype::HengZheWanGou,
    Archetype::ErHengZhe,
    Archetype::ShuZheZheGou,
    Archetype::HengPieWanGou,
    Archetype::HengWanGou,
    Archetype::HengZheWan,
    Archetype::HengZheTiao,
    Archetype::HengZheGou,
    Archetype::ShuWanGou,
    Archetype::PieTiao,
    Archetype::PieDian,
    Archetype::HengPie,
    Archetype::ShuPie,
    Archetype::ShuTiao,
    Archetype::TiaoNa,
    Archetype::WanGou,
    Archetype::XieGou,
    Archetype::HengGou,
    Archetype::HengZhe,
    Archetype::ShuGou,
    Archetype::ShuZhe,
    Archetype::ShuWan,
    Archetype::Curve,
    Archetype::Tiao,
    Archetype::Na,
    Archetype::Dian,
    Archetype::Shu,
    Archetype::Line,
];

impl Archetype {
    pub const ALL: [Archetype; 30] = CLASSIFY_ORDER;

    /// The sub-segments of this archetype in the order their bones are chained.
    pub fn segments(self) -> &'static [SkeletonSegment] {
        match self {
            Archetype::Line => LINE,
            Archetype::Curve => CURVE,
            Archetype::HengGou => HENG_GOU,
            Archetype::HengPie => HENG_PIE,
            Archetype::HengZheGou => HENG_ZHE_GOU,
            Archetype::HengZheWan => HENG_ZHE_WAN,
            Archetype::HengZheTiao => HENG_ZHE_TIAO,
            Archetype::HengWanGou => HENG_WAN_GOU,
            Archetype::HengZheWanGou => HENG_ZHE_WAN_GOU,
            Archetype::HengPieWanGou => HENG_PIE_WAN_GOU,
            Archetype::HengZheZhePie => HENG_ZHE_ZHE_PIE,
            Archetype::HengZheZheWanGou => HENG_ZHE_ZHE_WAN_GOU,
            Archetype::ErHengZhe => ER_HENG_ZHE,
            Archetype::ShuGou => SHU_GOU,
            Archetype::ShuZhe => SHU_ZHE,
            Archetype::ShuPie => SHU_PIE,
            Archetype::ShuWanGou => SHU_WAN_GOU,
            Archetype::ShuZheZheGou => SHU_ZHE_ZHE_GOU,
            Archetype::TiaoNa => TIAO_NA,
            Archetype::PieTiao => PIE_TIAO,
            Archetype::PieDian => PIE_DIAN,
            Archetype::WanGou => WAN_GOU,
            Archetype::XieGou => XIE_GOU,
            Archetype::HengZhe => HENG_ZHE,
            Archetype::ShuWan => SHU_WAN,
            Archetype::ShuTiao => SHU_TIAO,
            Archetype::Shu => SHU,
            Archetype::Tiao => TIAO,
            Archetype::Na => NA,
            Archetype::Dian => DIAN,
        }
    }

    /// Every joint name this archetype needs.
    pub fn joint_names(self) -> Vec<String> {
        self.segments()
            .iter()
            .flat_map(SkeletonSegment::joint_names)
            .collect()
    }

    pub fn matches(self, skeleton: &Skeleton) -> bool {
        self.joint_names()
            .iter()
            .all(|name| skeleton.contains(name))
    }
}

/// Picks the archetype of `skeleton` from the names of its joints.
///
/// Joint sets that match nothing are treated as a [`Archetype::Line`], even
/// when they lack `start` and `end`; such a line has no bones.
pub fn classify(skeleton: &Skeleton) -> Archetype {
    match CLASSIFY_ORDER.iter().find(|a| a.matches(skeleton)) {
        Some(archetype) => *archetype,
        None => {
            log::debug!(
                "unrecognized joints {:?}, treating stroke as a line",
                skeleton.names().collect::<Vec<_>>()
            );
            Archetype::Line
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{dvec2, DVec2};

    fn skeleton_with(names: &[String]) -> Skeleton {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), dvec2(i as f64 * 10.0, 0.0)))
            .collect()
    }

    #[test]
    fn two_joints_are_a_line() {
        let skeleton = Skeleton::new()
            .with_joint("start", DVec2::ZERO)
            .with_joint("end", dvec2(100.0, 0.0));
        assert_eq!(classify(&skeleton), Archetype::Line);
    }

    #[test]
    fn three_joints_are_a_curve() {
        let skeleton = Skeleton::new()
            .with_joint("start", DVec2::ZERO)
            .with_joint("bend", dvec2(50.0, 50.0))
            .with_joint("end", dvec2(100.0, 0.0));
        assert_eq!(classify(&skeleton), Archetype::Curve);
    }

    #[test]
    fn unknown_joints_fall_back_to_a_line() {
        let skeleton = Skeleton::new()
            .with_joint("foo", DVec2::ZERO)
            .with_joint("bar", dvec2(1.0, 1.0));
        assert_eq!(classify(&skeleton), Archetype::Line);
        assert_eq!(classify(&Skeleton::new()), Archetype::Line);
    }

    #[test]
    fn every_archetype_classifies_as_itself() {
        for archetype in Archetype::ALL {
            let skeleton = skeleton_with(&archetype.joint_names());
            assert_eq!(classify(&skeleton), archetype, "{archetype:?}");
        }
    }

    #[test]
    fn larger_archetypes_are_checked_first() {
        for pair in CLASSIFY_ORDER.windows(2) {
            assert!(pair[0].joint_names().len() >= pair[1].joint_names().len());
        }
    }

    #[test]
    fn compound_joint_names() {
        assert_eq!(
            Archetype::HengPie.joint_names(),
            ["heng_start", "heng_end", "pie_start", "pie_bend", "pie_end"]
        );
    }

    #[test]
    fn template_skeletons_are_recognized() {
        let cases: [(&[&str], Archetype); 8] = [
            (&["shu_start", "shu_end", "wan_start", "wan_end"], Archetype::ShuWan),
            (
                &["shu_start", "shu_end", "tiao_start", "tiao_bend", "tiao_end"],
                Archetype::ShuTiao,
            ),
            (&["heng_start", "heng_end", "zhe_start", "zhe_end"], Archetype::HengZhe),
            (&["shu_start", "shu_end"], Archetype::Shu),
            (&["tiao_start", "tiao_bend", "tiao_end"], Archetype::Tiao),
            (&["na_start", "na_bend", "na_end"], Archetype::Na),
            (&["dian_start", "dian_bend", "dian_end"], Archetype::Dian),
            (
                &[
                    "heng_start", "heng_end", "zhe_start", "zhe_end", "tiao_start",
                    "tiao_bend", "tiao_end",
                ],
                Archetype::HengZheTiao,
            ),
        ];

        for (names, expected) in cases {
            let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
            assert_eq!(classify(&skeleton_with(&names)), expected, "{names:?}");
        }
    }

    #[test]
    fn bendable_segments_only_need_their_ends() {
        assert_eq!(
            Archetype::HengZheTiao.joint_names(),
            ["heng_start", "heng_end", "zhe_start", "zhe_end", "tiao_start", "tiao_end"]
        );
        assert_eq!(
            Archetype::HengPieWanGou.joint_names(),
            [
                "heng_start",
                "heng_end",
                "pie_start",
                "pie_end",
                "wangou_start",
                "wangou_bend",
                "wangou_end"
            ]
        );
    }

    #[test]
    fn archetypes_serialize_in_snake_case() {
        assert_eq!(
            serde_json::to_string(&Archetype::HengZheZhePie).unwrap(),
            "\"heng_zhe_zhe_pie\""
        );
    }
}
