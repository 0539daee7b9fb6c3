use crate::Ec2Error;
use serde::{Deserialize, Serialize};

/// One cloud image description, as reported by DescribeImages.
///
/// Decoded from the provider's XML and re-serialized to JSON with the
/// provider's own field names; Herald reads only `root_device_type` and
/// treats the rest as opaque payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ImageRecord {
    #[serde(rename = "imageId")]
    pub image_id: String,
    #[serde(rename = "imageLocation", default, skip_serializing_if = "Option::is_none")]
    pub image_location: Option<String>,
    #[serde(rename = "imageState", default, skip_serializing_if = "Option::is_none")]
    pub image_state: Option<String>,
    #[serde(rename = "imageOwnerId", default, skip_serializing_if = "Option::is_none")]
    pub image_owner_id: Option<String>,
    #[serde(rename = "isPublic", default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(rename = "architecture", default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    #[serde(rename = "imageType", default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(rename = "platform", default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "rootDeviceType", default, skip_serializing_if = "Option::is_none")]
    pub root_device_type: Option<String>,
    #[serde(rename = "rootDeviceName", default, skip_serializing_if = "Option::is_none")]
    pub root_device_name: Option<String>,
    #[serde(
        rename = "virtualizationType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub virtualization_type: Option<String>,
    #[serde(rename = "hypervisor", default, skip_serializing_if = "Option::is_none")]
    pub hypervisor: Option<String>,
    #[serde(rename = "creationDate", default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(rename = "enaSupport", default, skip_serializing_if = "Option::is_none")]
    pub ena_support: Option<bool>,
    #[serde(
        rename = "blockDeviceMapping",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub block_device_mapping: Option<BlockDeviceMapping>,
    #[serde(rename = "tagSet", default, skip_serializing_if = "Option::is_none")]
    pub tag_set: Option<TagSet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlockDeviceMapping {
    #[serde(rename = "item", default)]
    pub item: Vec<BlockDevice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BlockDevice {
    #[serde(rename = "deviceName", default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(rename = "virtualName", default, skip_serializing_if = "Option::is_none")]
    pub virtual_name: Option<String>,
    #[serde(rename = "ebs", default, skip_serializing_if = "Option::is_none")]
    pub ebs: Option<EbsBlockDevice>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EbsBlockDevice {
    #[serde(rename = "snapshotId", default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(rename = "volumeSize", default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<u64>,
    #[serde(
        rename = "deleteOnTermination",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub delete_on_termination: Option<bool>,
    #[serde(rename = "volumeType", default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    #[serde(rename = "encrypted", default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TagSet {
    #[serde(rename = "item", default)]
    pub item: Vec<Tag>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Tag {
    #[serde(rename = "key")]
    pub key: String,
    #[serde(rename = "value")]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DescribeImagesResponse {
    #[serde(rename = "requestId", default)]
    pub request_id: String,
    #[serde(rename = "imagesSet", default)]
    pub images_set: ImagesSet,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ImagesSet {
    #[serde(rename = "item", default)]
    pub item: Vec<ImageRecord>,
}

pub(crate) fn decode_describe_images(xml: &str) -> Result<Vec<ImageRecord>, Ec2Error> {
    let response: DescribeImagesResponse =
        quick_xml::de::from_str(xml).map_err(|e| Ec2Error::Decode(e.to_string()))?;
    tracing::debug!(
        "DescribeImages request {} returned {} record(s)",
        response.request_id,
        response.images_set.item.len()
    );
    Ok(response.images_set.item)
}
